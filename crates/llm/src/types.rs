//! Provider configuration types.
//!
//! The configuration record arrives from the external config loader as a
//! JSON value with a `type` discriminator. Parsing is a two-step affair so
//! the error taxonomy stays precise: a missing `type` is a configuration
//! error, an unrecognized `type` is an unknown-provider error, and only then
//! is the variant-specific payload deserialized.

use querypilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Provider discriminators recognized by the factory.
const KNOWN_PROVIDERS: &[&str] = &["openai", "ollama"];

/// Settings for the OpenAI (cloud-chat) provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// API credential (required)
    pub api_key: String,

    /// Model identifier
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Retry count for transient transport failures
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Organization header
    #[serde(default)]
    pub organization: Option<String>,

    /// Override for the API base URL
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

/// Settings for the Ollama (local-inference) provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    /// Base URI of the inference server (required)
    pub uri: String,

    /// Model identifier (required)
    pub model: String,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Parsed provider configuration.
///
/// An explicit enumerated variant type: the set of providers is closed and
/// dispatch is static, rather than driven by a runtime registry.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiSettings),
    Ollama(OllamaSettings),
}

impl ProviderConfig {
    /// Parse a provider configuration from a raw JSON record.
    ///
    /// # Errors
    /// - `AppError::Config` if the `type` field is missing or a required
    ///   variant field is absent/empty
    /// - `AppError::UnknownProvider` if `type` names no known provider
    pub fn from_value(value: &serde_json::Value) -> AppResult<Self> {
        let provider_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::Config("Provider type not specified in configuration".to_string())
            })?
            .to_lowercase();

        match provider_type.as_str() {
            "openai" => {
                let settings: OpenAiSettings =
                    serde_json::from_value(value.clone()).map_err(|e| {
                        AppError::Config(format!("Invalid OpenAI provider config: {}", e))
                    })?;
                if settings.api_key.is_empty() {
                    return Err(AppError::Config(
                        "OpenAI provider requires an api_key".to_string(),
                    ));
                }
                Ok(Self::OpenAi(settings))
            }
            "ollama" => {
                let settings: OllamaSettings =
                    serde_json::from_value(value.clone()).map_err(|e| {
                        AppError::Config(format!("Invalid Ollama provider config: {}", e))
                    })?;
                if settings.uri.is_empty() {
                    return Err(AppError::Config(
                        "Ollama provider requires a uri".to_string(),
                    ));
                }
                if settings.model.is_empty() {
                    return Err(AppError::Config(
                        "Ollama provider requires a model".to_string(),
                    ));
                }
                Ok(Self::Ollama(settings))
            }
            other => Err(AppError::UnknownProvider(format!(
                "{}. Available types: {}",
                other,
                KNOWN_PROVIDERS.join(", ")
            ))),
        }
    }

    /// Get the canonical provider name.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::Ollama(_) => "ollama",
        }
    }

    /// Get the model name for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(settings) => &settings.model,
            Self::Ollama(settings) => &settings.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_openai_config() {
        let value = serde_json::json!({
            "type": "openai",
            "api_key": "test-key",
        });

        let config = ProviderConfig::from_value(&value).unwrap();
        assert_eq!(config.provider_name(), "openai");
        assert_eq!(config.model(), "gpt-3.5-turbo");

        match config {
            ProviderConfig::OpenAi(settings) => {
                assert_eq!(settings.api_key, "test-key");
                assert_eq!(settings.temperature, 0.7);
                assert!(settings.organization.is_none());
            }
            _ => panic!("Expected OpenAI config"),
        }
    }

    #[test]
    fn test_parse_openai_config_with_options() {
        let value = serde_json::json!({
            "type": "openai",
            "api_key": "test-key",
            "model": "gpt-4",
            "temperature": 0.2,
            "timeout": 30,
            "max_retries": 2,
            "organization": "org-123",
        });

        match ProviderConfig::from_value(&value).unwrap() {
            ProviderConfig::OpenAi(settings) => {
                assert_eq!(settings.model, "gpt-4");
                assert_eq!(settings.temperature, 0.2);
                assert_eq!(settings.timeout, Some(30));
                assert_eq!(settings.max_retries, Some(2));
                assert_eq!(settings.organization.as_deref(), Some("org-123"));
            }
            _ => panic!("Expected OpenAI config"),
        }
    }

    #[test]
    fn test_parse_ollama_config() {
        let value = serde_json::json!({
            "type": "ollama",
            "uri": "http://localhost:11434",
            "model": "llama3.2",
        });

        let config = ProviderConfig::from_value(&value).unwrap();
        assert_eq!(config.provider_name(), "ollama");
        assert_eq!(config.model(), "llama3.2");
    }

    #[test]
    fn test_missing_type_is_config_error() {
        let value = serde_json::json!({"api_key": "test-key"});
        match ProviderConfig::from_value(&value) {
            Err(AppError::Config(msg)) => assert!(msg.contains("type not specified")),
            other => panic!("Expected Config error, got {:?}", other.map(|c| c.provider_name())),
        }
    }

    #[test]
    fn test_unknown_type_is_unknown_provider_error() {
        let value = serde_json::json!({"type": "hal9000"});
        match ProviderConfig::from_value(&value) {
            Err(AppError::UnknownProvider(msg)) => {
                assert!(msg.contains("hal9000"));
                assert!(msg.contains("openai"));
            }
            other => panic!("Expected UnknownProvider error, got {:?}", other.map(|c| c.provider_name())),
        }
    }

    #[test]
    fn test_missing_required_field_is_config_error() {
        let value = serde_json::json!({"type": "ollama", "model": "llama3.2"});
        assert!(matches!(
            ProviderConfig::from_value(&value),
            Err(AppError::Config(_))
        ));

        let value = serde_json::json!({"type": "openai", "api_key": ""});
        assert!(matches!(
            ProviderConfig::from_value(&value),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_type_is_case_insensitive() {
        let value = serde_json::json!({
            "type": "OpenAI",
            "api_key": "test-key",
        });
        assert!(ProviderConfig::from_value(&value).is_ok());
    }
}
