//! Register command handler.
//!
//! Adds templates to the registry store: inline, from a prompts JSON file,
//! or the built-in sample library.

use clap::Args;
use querypilot_core::{config::AppConfig, AppError, AppResult};
use querypilot_registry::InMemoryRegistry;
use std::collections::HashMap;
use std::path::PathBuf;

/// Register templates in the registry store
#[derive(Args, Debug)]
pub struct RegisterCommand {
    /// Template body with {{ variable }} placeholders
    pub template: Option<String>,

    /// Template name (required with an inline template)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Register templates from a JSON file: {"prompts": [...]}
    #[arg(short, long, conflicts_with = "template")]
    pub file: Option<PathBuf>,

    /// Register the built-in sample templates
    #[arg(long, conflicts_with_all = ["template", "file"])]
    pub samples: bool,

    /// With --samples, skip templates that already exist
    #[arg(long, requires = "samples")]
    pub only_new: bool,

    /// Tags as key=value pairs (e.g. --tag type=essay)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

impl RegisterCommand {
    /// Execute the register command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let registry = InMemoryRegistry::load_store(&config.registry_path)?;

        if self.samples {
            let report = registry.register_samples(self.only_new)?;
            registry.save_store(&config.registry_path)?;
            println!("Registered {} sample template(s)", report.registered);
            if report.skipped > 0 {
                println!("Skipped {} existing template(s)", report.skipped);
            }
            return Ok(());
        }

        if let Some(file) = &self.file {
            let count = registry.import_file(file)?;
            registry.save_store(&config.registry_path)?;
            println!("Registered {} template(s) from {:?}", count, file);
            return Ok(());
        }

        let template = self.template.as_deref().ok_or_else(|| {
            AppError::Config("Provide a template body, --file, or --samples".to_string())
        })?;
        let name = self.name.as_deref().ok_or_else(|| {
            AppError::Config("Inline registration requires --name".to_string())
        })?;

        let registered = registry.register(name, template, self.parse_tags()?)?;
        registry.save_store(&config.registry_path)?;

        println!(
            "Registered '{}' version {} (variables: {})",
            registered.name,
            registered.version,
            registered.variables().join(", ")
        );

        Ok(())
    }

    fn parse_tags(&self) -> AppResult<HashMap<String, String>> {
        self.tags
            .iter()
            .map(|pair| {
                pair.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .ok_or_else(|| {
                        AppError::Config(format!("Invalid tag '{}', expected key=value", pair))
                    })
            })
            .collect()
    }
}
