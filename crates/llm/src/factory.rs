//! Provider factory.
//!
//! Maps a raw configuration record onto a concrete provider. The dispatch
//! table is the `ProviderConfig` enum: the set of providers is closed and
//! every variant has exactly one constructor.

use crate::client::Provider;
use crate::providers::{OllamaProvider, OpenAiProvider};
use crate::types::ProviderConfig;
use querypilot_core::AppResult;
use std::sync::Arc;

/// Create a provider from a raw configuration record.
///
/// # Arguments
/// * `config` - JSON record with a `type` discriminator ("openai", "ollama")
///   and variant-specific fields
///
/// # Errors
/// - `AppError::Config` if `type` is missing or required fields are absent
/// - `AppError::UnknownProvider` if `type` names no known provider
pub fn create_provider(config: &serde_json::Value) -> AppResult<Arc<dyn Provider>> {
    let config = ProviderConfig::from_value(config)?;

    tracing::info!(
        provider = config.provider_name(),
        model = config.model(),
        "Creating provider"
    );

    match config {
        ProviderConfig::OpenAi(settings) => Ok(Arc::new(OpenAiProvider::new(settings)?)),
        ProviderConfig::Ollama(settings) => Ok(Arc::new(OllamaProvider::new(settings)?)),
    }
}
