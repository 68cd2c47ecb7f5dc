//! HTTP transport for the opponent service.
//!
//! Speaks the service's JSON wire format: boards travel as nine-element
//! arrays of `"X"`, `"O"`, or `null`, indexed row-major from the top-left.

use super::{OpponentService, OpponentStatus, ServiceError, TrainingReport};
use crate::game::{Board, Mark, Outcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Per-request timeout. A stuck service should surface as an error, not a
/// permanently pending turn.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Training runs as long as the requested rounds take, so it gets a much
/// longer timeout than ordinary requests.
const TRAINING_TIMEOUT: Duration = Duration::from_secs(300);

/// Opponent service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOpponentService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOpponentService {
    /// Creates a client for the service rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::new(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Board as it travels on the wire.
fn wire_board(board: &Board) -> [Option<Mark>; 9] {
    let mut cells = [None; 9];
    for (index, cell) in board.cells().iter().enumerate() {
        cells[index] = cell.mark();
    }
    cells
}

/// Winner label for the learning endpoint: `"X"`, `"O"`, or `"Draw"`.
fn winner_label(outcome: Outcome) -> String {
    match outcome.winner() {
        Some(mark) => mark.to_string(),
        None => "Draw".to_string(),
    }
}

#[derive(Debug, Serialize)]
struct MoveRequest {
    board: [Option<Mark>; 9],
}

#[derive(Debug, Deserialize)]
struct MoveResponse {
    #[serde(rename = "move")]
    index: Option<usize>,
}

#[derive(Debug, Serialize)]
struct LearnRequest {
    board: [Option<Mark>; 9],
    winner: String,
}

#[derive(Debug, Serialize)]
struct TrainRequest {
    rounds: u32,
}

#[async_trait]
impl OpponentService for HttpOpponentService {
    #[instrument(skip(self, board), fields(board = %board.compact()))]
    async fn request_move(&self, board: &Board) -> Result<Option<usize>, ServiceError> {
        let request = MoveRequest {
            board: wire_board(board),
        };
        let response = self
            .client
            .post(self.url("/ai/move"))
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ServiceError::new(format!(
                "move request failed with status {}",
                response.status()
            )));
        }
        let payload: MoveResponse = response.json().await?;
        debug!(index = ?payload.index, "opponent service answered");
        Ok(payload.index)
    }

    #[instrument(skip(self, board), fields(board = %board.compact(), winner = %winner_label(outcome)))]
    async fn notify_outcome(&self, board: &Board, outcome: Outcome) -> Result<(), ServiceError> {
        let request = LearnRequest {
            board: wire_board(board),
            winner: winner_label(outcome),
        };
        let response = self
            .client
            .post(self.url("/ai/learn"))
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ServiceError::new(format!(
                "learning notification failed with status {}",
                response.status()
            )));
        }
        debug!("outcome reported");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_status(&self) -> Result<OpponentStatus, ServiceError> {
        let response = self.client.get(self.url("/ai/status")).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::new(format!(
                "status request failed with status {}",
                response.status()
            )));
        }
        let status: OpponentStatus = response.json().await?;
        debug!(
            epsilon = status.epsilon,
            states = status.q_table_size,
            "status fetched"
        );
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn reset_knowledge(&self) -> Result<(), ServiceError> {
        let response = self.client.post(self.url("/ai/reset")).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::new(format!(
                "reset request failed with status {}",
                response.status()
            )));
        }
        debug!("knowledge reset");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_training(&self, rounds: u32) -> Result<TrainingReport, ServiceError> {
        let request = TrainRequest { rounds };
        let response = self
            .client
            .post(self.url("/ai/train"))
            .timeout(TRAINING_TIMEOUT)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ServiceError::new(format!(
                "training request failed with status {}",
                response.status()
            )));
        }
        let report: TrainingReport = response.json().await?;
        debug!(rounds = report.rounds_completed, "training finished");
        Ok(report)
    }
}
