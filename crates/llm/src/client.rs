//! Provider abstraction.
//!
//! This module defines the single capability every language-model backend
//! must expose to the pipeline.

use querypilot_core::AppResult;

/// Trait for language-model providers.
///
/// Providers hold no mutable session state between calls beyond their fixed
/// configuration, so a single instance is safe to share across concurrent
/// pipeline invocations.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Generate a text response for the given prompt.
    ///
    /// # Arguments
    /// * `prompt` - The user prompt text
    /// * `system` - Optional system message
    ///
    /// # Errors
    /// Returns `AppError::Provider` on network failures, authentication
    /// failures, or malformed backend responses. Callers decide whether to
    /// propagate or degrade; providers never swallow errors themselves.
    async fn generate_response(&self, prompt: &str, system: Option<&str>) -> AppResult<String>;
}
