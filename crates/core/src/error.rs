//! Error types for QueryPilot.
//!
//! This module defines a unified error enum covering all error categories
//! in the application: configuration, provider construction, provider calls,
//! structured-response parsing, registry access, and I/O.

use thiserror::Error;

/// Unified error type for QueryPilot.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Propagation policy: `Config` and `UnknownProvider` are fatal and surface
/// before any pipeline stage runs. `Provider` and `Parse` errors raised
/// inside the validation, adjustment, and generation stages are recovered
/// locally with a stage-specific fallback; only a provider failure during
/// matching is allowed to reach the pipeline caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider `type` discriminator not recognized by the factory
    #[error("Unknown provider type: {0}")]
    UnknownProvider(String),

    /// Network or backend failure during a provider call
    #[error("Provider error: {0}")]
    Provider(String),

    /// Malformed structured response from a provider
    #[error("Parse error: {0}")]
    Parse(String),

    /// Template registry errors (unknown template, bad prompt file)
    #[error("Registry error: {0}")]
    Registry(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
