//! QueryPilot CLI
//!
//! Main entry point for the querypilot command-line tool. Routes free-form
//! queries through the template-matching refinement pipeline.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, ListCommand, RegisterCommand};
use querypilot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// QueryPilot - route queries through registered prompt templates
#[derive(Parser, Debug)]
#[command(name = "querypilot")]
#[command(about = "Route queries through registered prompt templates", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "QUERYPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the template registry store
    #[arg(short, long, global = true, env = "QUERYPILOT_REGISTRY")]
    registry: Option<PathBuf>,

    /// LLM provider type (openai, ollama)
    #[arg(short, long, global = true, env = "QUERYPILOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "QUERYPILOT_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a query through the refinement pipeline
    Chat(ChatCommand),

    /// Register templates in the registry store
    Register(RegisterCommand),

    /// List registered templates
    List(ListCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.registry,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    )?;

    // Initialize logging with final configuration
    logging::init_logging(&config)?;

    tracing::info!("QueryPilot starting");
    tracing::debug!("Registry store: {:?}", config.registry_path);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Register(_) => "register",
        Commands::List(_) => "list",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Register(cmd) => cmd.execute(&config).await,
        Commands::List(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
