//! OpenAI provider implementation.
//!
//! Talks to the chat-completions endpoint of the OpenAI API (or a
//! compatible server when `base_url` is overridden).

use crate::client::Provider;
use crate::types::OpenAiSettings;
use querypilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response body, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI chat provider.
pub struct OpenAiProvider {
    settings: OpenAiSettings,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a provider from parsed settings.
    ///
    /// The request timeout from the settings is baked into the HTTP client,
    /// so every call this provider makes is independently bounded.
    pub fn new(settings: OpenAiSettings) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn build_request(&self, prompt: &str, system: Option<&str>) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
        }
    }

    async fn send_once(&self, body: &ChatRequest) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(body);

        if let Some(org) = &self.settings.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to reach OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Provider("OpenAI response contained no choices".to_string()))
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_response(&self, prompt: &str, system: Option<&str>) -> AppResult<String> {
        tracing::debug!(model = %self.settings.model, "Sending prompt to OpenAI");

        let body = self.build_request(prompt, system);
        let attempts = self.settings.max_retries.unwrap_or(0) + 1;

        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.send_once(&body).await {
                Ok(content) => {
                    tracing::debug!("Received completion from OpenAI");
                    return Ok(content);
                }
                Err(err) => {
                    if attempt < attempts {
                        tracing::warn!("OpenAI call failed (attempt {}): {}", attempt, err);
                    }
                    last_err = Some(err);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AppError::Provider("OpenAI call never attempted".to_string())))
    }
}
