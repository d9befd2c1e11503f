//! Logging setup.
//!
//! One fmt layer writing to stderr, so stdout stays clean for command
//! output. The filter directives come from the resolved configuration,
//! falling back to `RUST_LOG` and then to `info`.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Install the global tracing subscriber for this process.
pub fn init_logging(config: &AppConfig) -> AppResult<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(use_ansi(config));

    tracing_subscriber::registry()
        .with(log_filter(config)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Build the level filter from the configured level, `RUST_LOG`, or `info`.
fn log_filter(config: &AppConfig) -> AppResult<EnvFilter> {
    let directives = match &config.log_level {
        Some(level) => level.clone(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

/// Color only when the configuration allows it and stderr is a terminal.
fn use_ansi(config: &AppConfig) -> bool {
    if config.no_color || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_configured_level() {
        let mut config = AppConfig::default();
        config.log_level = Some("debug".to_string());
        assert!(log_filter(&config).is_ok());
    }

    #[test]
    fn test_invalid_filter_is_config_error() {
        let mut config = AppConfig::default();
        config.log_level = Some("querypilot=not_a_level".to_string());
        assert!(matches!(log_filter(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_no_color_disables_ansi() {
        let mut config = AppConfig::default();
        config.no_color = true;
        assert!(!use_ansi(&config));
    }

    #[test]
    fn test_init_logging() {
        // Can only be initialized once per process, so accept either outcome
        let result = init_logging(&AppConfig::default());
        assert!(result.is_ok() || result.is_err());
    }
}
