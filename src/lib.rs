//! Ticmytoe library - turn orchestration for a learning tic-tac-toe opponent.
//!
//! The opponent's decision making and learning live in a separate HTTP
//! service; this crate owns everything around it: the canonical board, the
//! turn state machine, staleness protection for in-flight requests, the
//! training-time exhibition, and the terminal front end.
//!
//! # Architecture
//!
//! - **Game**: board snapshots and the pure outcome detector
//! - **Orchestrator**: turn sequencing, request guarding, derived status text
//! - **Service**: the opponent's wire contract (moves, learning, metrics)
//! - **Sim**: exhibition games shown while bulk training runs
//! - **Tui**: terminal front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticmytoe::{Command, HttpOpponentService, Orchestrator};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = Arc::new(HttpOpponentService::new("http://localhost:8000")?);
//! let (command_tx, command_rx) = mpsc::unbounded_channel();
//! let (view_tx, mut view_rx) = mpsc::unbounded_channel();
//! let mut orchestrator = Orchestrator::new(service, command_rx, view_tx);
//! tokio::spawn(async move { orchestrator.run().await });
//!
//! command_tx.send(Command::Place(4))?;
//! while let Some(view) = view_rx.recv().await {
//!     println!("{}", view.headline);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod game;
pub mod orchestrator;
pub mod service;
pub mod sim;
pub mod tui;

// Crate-level exports - game types
pub use game::{Board, Cell, InvalidMove, Mark, Outcome, detect_outcome};

// Crate-level exports - orchestration
pub use orchestrator::{
    Command, Fault, GameSession, Orchestrator, Phase, ScoreTally, SessionView, Step,
};

// Crate-level exports - opponent service
pub use service::{
    HttpOpponentService, OpponentService, OpponentStatus, ServiceError, TrainingReport,
};

// Crate-level exports - configuration
pub use config::Config;
