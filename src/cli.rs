//! Command-line interface for ticmytoe.

use clap::{Parser, Subcommand};

/// Tic-my-Toe - terminal tic-tac-toe against a self-learning opponent
#[derive(Parser, Debug)]
#[command(name = "ticmytoe")]
#[command(about = "Play tic-tac-toe against a self-learning opponent service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Opponent service URL (overrides TICMYTOE_SERVICE_URL)
    #[arg(long)]
    pub service_url: Option<String>,

    /// Subcommand to run; defaults to the interactive game
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play against the opponent in the terminal
    Play,

    /// Print the opponent's learning metrics and exit
    Status,

    /// Run bulk self-play training on the opponent service
    Train {
        /// Number of training rounds to request
        #[arg(short, long, default_value = "100")]
        rounds: u32,
    },

    /// Clear the opponent's learned knowledge
    Reset,
}
