//! Ollama provider implementation.
//!
//! Integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::Provider;
use crate::types::OllamaSettings;
use querypilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama generate request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
}

/// Ollama generate response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Model listing from `/api/tags`.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

/// Ollama local-inference provider.
pub struct OllamaProvider {
    uri: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider from parsed settings.
    pub fn new(settings: OllamaSettings) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            uri: settings.uri.trim_end_matches('/').to_string(),
            model: settings.model,
            client,
        })
    }

    /// Confirm the configured model is present on the server.
    ///
    /// A bare model name matches any tag of that model, so "llama3" accepts
    /// "llama3:latest".
    async fn ensure_model_available(&self) -> AppResult<()> {
        let url = format!("{}/api/tags", self.uri);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to reach Ollama at {}: {}", self.uri, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Ollama model list: {}", e)))?;

        let available = tags
            .models
            .iter()
            .any(|m| model_matches(&m.name, &self.model));

        if !available {
            let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
            return Err(AppError::Provider(format!(
                "Model '{}' not available on Ollama server at {}. Available models: {}",
                self.model,
                self.uri,
                if names.is_empty() {
                    "(none)".to_string()
                } else {
                    names.join(", ")
                }
            )));
        }

        Ok(())
    }
}

/// Match a requested model against an installed tag.
fn model_matches(installed: &str, requested: &str) -> bool {
    if installed == requested {
        return true;
    }
    // Bare request matches any tag of the same model
    !requested.contains(':') && installed.split(':').next() == Some(requested)
}

#[async_trait::async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_response(&self, prompt: &str, system: Option<&str>) -> AppResult<String> {
        tracing::debug!(model = %self.model, "Sending prompt to Ollama");

        // Fail fast with a descriptive error before issuing a generation
        self.ensure_model_available().await?;

        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            stream: false,
        };

        let url = format!("{}/api/generate", self.uri);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!("Received completion from Ollama");

        Ok(ollama_response.response)
    }
}
