//! Configuration management for QueryPilot.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config file (querypilot.yaml)
//!
//! The provider section of the config file is kept as a raw map and handed
//! to the provider factory, which owns validation of the `type` discriminator
//! and the per-provider required fields.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Path to the template registry store (JSON file)
    pub registry_path: PathBuf,

    /// Provider override (e.g. "openai", "ollama"); replaces the `type`
    /// field of the provider record when set
    pub provider: Option<String>,

    /// Model override
    pub model: Option<String>,

    /// API key override for cloud providers
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider record from the config file, if any
    provider_section: Option<serde_json::Value>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    /// Provider record with a `type` discriminator, passed to the factory
    provider: Option<serde_json::Value>,
    registry: Option<RegistryConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            registry_path: PathBuf::from("templates.json"),
            provider: None,
            model: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            provider_section: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `QUERYPILOT_CONFIG`: Path to config file
    /// - `QUERYPILOT_REGISTRY`: Path to the template store
    /// - `QUERYPILOT_PROVIDER`: Provider type override
    /// - `QUERYPILOT_MODEL`: Model identifier override
    /// - `QUERYPILOT_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("QUERYPILOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if let Some(path) = config.config_file.clone() {
            config.merge_yaml(&path)?;
        } else {
            // Optional default location; absence is not an error
            let default_path = PathBuf::from("querypilot.yaml");
            if default_path.exists() {
                config.merge_yaml(&default_path)?;
                config.config_file = Some(default_path);
            }
        }

        // Environment variables override the config file
        config.apply_env();

        Ok(config)
    }

    /// Apply the environment-variable overrides to this config.
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("QUERYPILOT_REGISTRY") {
            self.registry_path = PathBuf::from(path);
        }

        if let Ok(provider) = std::env::var("QUERYPILOT_PROVIDER") {
            self.provider = Some(provider);
        }

        if let Ok(model) = std::env::var("QUERYPILOT_MODEL") {
            self.model = Some(model);
        }

        if let Ok(key) = std::env::var("QUERYPILOT_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(registry) = config_file.registry {
            if let Some(path) = registry.path {
                self.registry_path = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        self.provider_section = config_file.provider;

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables, which take
    /// precedence over the config file.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        registry_path: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> AppResult<Self> {
        if let Some(config_file) = config_file {
            self.merge_yaml(&config_file)?;
            self.config_file = Some(config_file);
            // Env vars outrank the file even when the file arrives here
            self.apply_env();
        }

        if let Some(registry_path) = registry_path {
            self.registry_path = registry_path;
        }

        if let Some(provider) = provider {
            self.provider = Some(provider);
        }

        if let Some(model) = model {
            self.model = Some(model);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        Ok(self)
    }

    /// Assemble the provider configuration record for the factory.
    ///
    /// Starts from the `provider:` section of the config file and applies
    /// the `provider`, `model`, and `api_key` overrides. Returns a `Config`
    /// error when no provider is configured at all; the factory owns all
    /// further validation.
    pub fn provider_config(&self) -> AppResult<serde_json::Value> {
        let mut record = match &self.provider_section {
            Some(section) => section.clone(),
            None => serde_json::Value::Object(serde_json::Map::new()),
        };

        let map = record.as_object_mut().ok_or_else(|| {
            AppError::Config("Provider section must be a mapping".to_string())
        })?;

        if let Some(provider) = &self.provider {
            map.insert("type".to_string(), serde_json::json!(provider));
        }
        if let Some(model) = &self.model {
            map.insert("model".to_string(), serde_json::json!(model));
        }
        if let Some(api_key) = &self.api_key {
            map.insert("api_key".to_string(), serde_json::json!(api_key));
        }

        if map.is_empty() {
            return Err(AppError::Config(
                "No provider configured. Set a provider section in the config file \
                 or pass --provider"
                    .to_string(),
            ));
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes tests that read or mutate process environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.registry_path, PathBuf::from("templates.json"));
        assert!(config.provider.is_none());
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    fn clear_env() {
        for var in [
            "QUERYPILOT_REGISTRY",
            "QUERYPILOT_PROVIDER",
            "QUERYPILOT_MODEL",
            "QUERYPILOT_API_KEY",
            "RUST_LOG",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_merge_yaml() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("querypilot.yaml");
        fs::write(
            &path,
            r#"
provider:
  type: ollama
  uri: http://localhost:11434
  model: llama3.2
registry:
  path: /tmp/templates.json
logging:
  level: debug
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::default()
            .with_overrides(Some(path), None, None, None, None, false, false)
            .unwrap();

        assert_eq!(config.registry_path, PathBuf::from("/tmp/templates.json"));
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert!(config.no_color);

        let record = config.provider_config().unwrap();
        assert_eq!(record["type"], "ollama");
        assert_eq!(record["model"], "llama3.2");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("querypilot.yaml");
        fs::write(
            &path,
            "provider:\n  type: ollama\n  uri: http://localhost:11434\n  model: llama3.2\n",
        )
        .unwrap();

        let config = AppConfig::default()
            .with_overrides(
                Some(path),
                None,
                Some("openai".to_string()),
                Some("gpt-4".to_string()),
                None,
                true,
                false,
            )
            .unwrap();

        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));

        let record = config.provider_config().unwrap();
        assert_eq!(record["type"], "openai");
        assert_eq!(record["model"], "gpt-4");
    }

    #[test]
    fn test_provider_config_missing() {
        let config = AppConfig::default();
        assert!(config.provider_config().is_err());
    }

    #[test]
    fn test_env_outranks_config_file_passed_as_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("querypilot.yaml");
        fs::write(
            &path,
            "registry:\n  path: /from/file/templates.json\nlogging:\n  level: warn\n",
        )
        .unwrap();

        std::env::set_var("QUERYPILOT_REGISTRY", "/from/env/templates.json");

        let config = AppConfig::default()
            .with_overrides(Some(path), None, None, None, None, false, false)
            .unwrap();

        std::env::remove_var("QUERYPILOT_REGISTRY");

        // The env var survives the file merge; the file still supplies the rest
        assert_eq!(
            config.registry_path,
            PathBuf::from("/from/env/templates.json")
        );
        assert_eq!(config.log_level, Some("warn".to_string()));
    }
}
