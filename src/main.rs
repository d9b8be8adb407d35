mod shutdown;
mod startup;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Shows upcoming calendar events, volume and Bluetooth state on BetterTouchTool widgets
#[derive(Debug, Parser)]
#[command(name = "eventual", version, about)]
struct Cli {
    /// Path to the JSON or TOML configuration file
    config: PathBuf,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    // Only one copy may drive the widgets
    if startup::already_running().await {
        return Ok(());
    }

    info!("Starting Eventual");

    // Load configuration
    let config = startup::load_config(&cli.config)?;

    // Start the services
    startup::start(config).await
}
