//! LLM provider crate for QueryPilot.
//!
//! This crate provides a provider-agnostic abstraction for language-model
//! backends. Every provider exposes a single capability: generate text for a
//! prompt, with an optional system message.
//!
//! # Providers
//! - **OpenAI**: cloud chat-completion API
//! - **Ollama**: local inference server
//!
//! # Example
//! ```no_run
//! use querypilot_llm::{create_provider, Provider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = serde_json::json!({
//!     "type": "ollama",
//!     "uri": "http://localhost:11434",
//!     "model": "llama3.2"
//! });
//! let provider = create_provider(&config)?;
//! let answer = provider.generate_response("Hello, world!", None).await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::Provider;
pub use factory::create_provider;
pub use providers::{OllamaProvider, OpenAiProvider};
pub use types::{OllamaSettings, OpenAiSettings, ProviderConfig};
