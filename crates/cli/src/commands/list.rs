//! List command handler.
//!
//! Summarizes the registry, or shows the full detail of one template
//! including its version history.

use clap::Args;
use querypilot_core::{config::AppConfig, AppError, AppResult};
use querypilot_registry::InMemoryRegistry;

/// List registered templates
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Show details for a single template, including version history
    #[arg(short, long)]
    pub name: Option<String>,

    /// Show detailed information (includes the template body)
    #[arg(short, long)]
    pub details: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let registry = InMemoryRegistry::load_store(&config.registry_path)?;

        if let Some(name) = &self.name {
            return self.print_details(&registry, name);
        }

        let summaries = registry.list()?;

        if self.json || self.details {
            let json = serde_json::to_string_pretty(&summaries)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        if summaries.is_empty() {
            println!(
                "No templates registered. Use 'querypilot register --samples' to get started."
            );
            return Ok(());
        }

        for summary in summaries {
            println!(
                "{} (v{}, type: {}) variables: {}",
                summary.name,
                summary.version,
                summary.content_type,
                if summary.variables.is_empty() {
                    "none".to_string()
                } else {
                    summary.variables.join(", ")
                }
            );
        }

        Ok(())
    }

    fn print_details(&self, registry: &InMemoryRegistry, name: &str) -> AppResult<()> {
        let details = registry.details(name)?;

        if self.json {
            let json = serde_json::to_string_pretty(&details)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        println!("Template: {}", details.name);
        println!("Latest version: {}", details.latest_version);
        if let Some(production) = details.production_version {
            println!("Production version: {}", production);
        }
        if !details.archived_versions.is_empty() {
            let archived: Vec<String> = details
                .archived_versions
                .iter()
                .map(u32::to_string)
                .collect();
            println!("Archived versions: {}", archived.join(", "));
        }
        println!("Variables: {}", details.variables.join(", "));

        if !details.tags.is_empty() {
            let mut tags: Vec<String> = details
                .tags
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            tags.sort();
            println!("Tags: {}", tags.join(", "));
        }

        if self.details {
            println!("\nTemplate body:");
            println!("------------------------------");
            println!("{}", details.template);
            println!("------------------------------");
        }

        Ok(())
    }
}
