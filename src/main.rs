//! Tic-my-Toe - terminal front end for a self-learning opponent service.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use ticmytoe::cli::{Cli, Command};
use ticmytoe::config::Config;
use ticmytoe::orchestrator::status::knowledge_line;
use ticmytoe::service::{HttpOpponentService, OpponentService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::resolve(cli.service_url);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => ticmytoe::tui::run(config).await,
        Command::Status => run_status(config).await,
        Command::Train { rounds } => run_training(config, rounds).await,
        Command::Reset => run_reset(config).await,
    }
}

/// Console logging for the headless commands. The interactive game logs to
/// a file instead.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Print the opponent's learning metrics and exit.
async fn run_status(config: Config) -> Result<()> {
    init_tracing();
    let service = HttpOpponentService::new(config.service_url())?;
    let status = service.fetch_status().await?;
    println!("{}", knowledge_line(Some(&status)));
    Ok(())
}

/// Run bulk training, then report the refreshed metrics.
async fn run_training(config: Config, rounds: u32) -> Result<()> {
    init_tracing();
    info!(rounds, "requesting bulk training");
    let service = HttpOpponentService::new(config.service_url())?;
    let report = service.request_training(rounds).await?;
    println!("Training finished: {} rounds", report.rounds_completed);
    let status = service.fetch_status().await?;
    println!("{}", knowledge_line(Some(&status)));
    Ok(())
}

/// Clear the opponent's learned knowledge.
async fn run_reset(config: Config) -> Result<()> {
    init_tracing();
    let service = HttpOpponentService::new(config.service_url())?;
    service.reset_knowledge().await?;
    println!("Opponent knowledge cleared.");
    Ok(())
}
