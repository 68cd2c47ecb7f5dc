//! Opponent service contracts.
//!
//! The opponent's decision making, learning step, and knowledge store live
//! behind [`OpponentService`]. The orchestrator only ever sees the shapes
//! defined here; transport details stay in [`http`].

mod http;

pub use http::HttpOpponentService;

use crate::game::{Board, Outcome};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Failure while talking to the opponent service.
///
/// Carries only a human-readable description; the orchestrator does not
/// distinguish transport failures beyond surfacing them.
#[derive(Debug, Clone, Display, Error)]
#[display("opponent service error: {message}")]
pub struct ServiceError {
    /// Description shown in the error banner.
    pub message: String,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Learning metrics reported by the opponent service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentStatus {
    /// Exploration rate: the probability the service plays a random move.
    pub epsilon: f64,
    /// Number of board states the service has learned values for.
    pub q_table_size: u64,
    /// The service's value estimate for the empty board.
    pub initial_state_value: f64,
}

/// Acknowledgement returned when a bulk-training run settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Rounds the service actually completed.
    pub rounds_completed: u32,
}

/// Black-box decision service playing the `O` side.
///
/// Implementations must be cheap to share behind an `Arc`; the orchestrator
/// spawns one task per request and never holds a call across state changes.
#[async_trait]
pub trait OpponentService: Send + Sync {
    /// Picks a move for the given board.
    ///
    /// `Ok(None)` is only legitimate when the board is terminal or has no
    /// vacant cell; the sequencer treats any other `None` as a contract
    /// violation.
    async fn request_move(&self, board: &Board) -> Result<Option<usize>, ServiceError>;

    /// Reports a finished game so the service can run its learning step.
    async fn notify_outcome(&self, board: &Board, outcome: Outcome) -> Result<(), ServiceError>;

    /// Fetches current learning metrics. Display-only; failures are
    /// non-fatal.
    async fn fetch_status(&self) -> Result<OpponentStatus, ServiceError>;

    /// Clears all persisted learning on the service side.
    async fn reset_knowledge(&self) -> Result<(), ServiceError>;

    /// Runs `rounds` of self-play training on the service side.
    /// Long-running; the caller brackets the simulation driver around it.
    async fn request_training(&self, rounds: u32) -> Result<TrainingReport, ServiceError>;
}
