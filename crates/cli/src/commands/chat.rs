//! Chat command handler.
//!
//! Runs a query through the refinement pipeline and prints the result.

use clap::Args;
use querypilot_core::{config::AppConfig, AppResult};
use querypilot_engine::process_query_with_config;
use querypilot_registry::InMemoryRegistry;

/// Process a query through the refinement pipeline
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The query to process
    pub query: String,

    /// Output the full pipeline outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let registry = InMemoryRegistry::load_store(&config.registry_path)?;
        let provider_config = config.provider_config()?;

        let outcome =
            process_query_with_config(&self.query, &registry, &provider_config).await?;

        tracing::debug!(
            status = ?outcome.prompt_match.status,
            enhanced = outcome.enhanced,
            validation = ?outcome.validation_result,
            "Pipeline outcome"
        );

        if self.json {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| querypilot_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            if outcome.enhanced {
                tracing::info!(
                    template = outcome.prompt_match.prompt_name.as_deref().unwrap_or("?"),
                    "Query was enhanced before generation"
                );
            }
            println!("{}", outcome.response);
        }

        Ok(())
    }
}
