//! co2trainer - breath-hold training CLI
//!
#![doc = "co2trainer - breath-hold training CLI"]
#![doc = "Main entry point for the co2trainer application."]

use anyhow::Result;

use co2trainer::cli::{Cli, Commands};
use co2trainer::commands;
use co2trainer::config::Config;
use co2trainer::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    init_logging(&config.logging)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(owner = %config.profile.owner, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Train { reference, quiet } => {
            tracing::info!("Starting training run");
            commands::train::run_train(config, reference, quiet).await
        }
        Commands::Baseline { quiet } => {
            tracing::info!("Starting baseline test");
            commands::baseline::run_baseline(config, quiet).await
        }
        Commands::History { kind, limit, json } => {
            commands::history::handle_history(&config, kind, limit, json)
        }
        Commands::Stats { json } => commands::stats::handle_stats(&config, json),
        Commands::Protocol { reference } => commands::protocol::show_protocol(&config, reference),
    }
}
