//! User-facing status text derived from session and service state.
//!
//! Nothing here is stored: every line is recomputed from the current
//! [`GameSession`] and the latest [`OpponentStatus`] snapshot, so the text
//! can never disagree with the state it describes.

use crate::orchestrator::session::{GameSession, Phase, ScoreTally};
use crate::service::OpponentStatus;
use derive_more::Display;

/// Playing strength implied by the opponent's exploration rate.
///
/// A low rate means the service mostly exploits what it has learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Difficulty {
    /// Exploration below 0.15.
    Hard,
    /// Exploration below 0.5.
    Medium,
    /// Mostly random play.
    Easy,
}

impl Difficulty {
    /// Classifies an exploration rate.
    pub fn from_epsilon(epsilon: f64) -> Self {
        if epsilon < 0.15 {
            Self::Hard
        } else if epsilon < 0.5 {
            Self::Medium
        } else {
            Self::Easy
        }
    }
}

/// The opponent's own expectation for a fresh game, read from its value
/// estimate of the empty board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Forecast {
    /// Value above 0.7.
    #[display("Predicts Win")]
    Win,
    /// Value above 0.3.
    #[display("Predicts Draw")]
    Draw,
    /// Value above -0.5.
    #[display("Predicts Loss Likely")]
    LossLikely,
    /// Bottom of the scale.
    #[display("Predicts Loss")]
    Loss,
}

impl Forecast {
    /// Classifies an empty-board value estimate.
    pub fn from_value(value: f64) -> Self {
        if value > 0.7 {
            Self::Win
        } else if value > 0.3 {
            Self::Draw
        } else if value > -0.5 {
            Self::LossLikely
        } else {
            Self::Loss
        }
    }
}

/// The headline above the board. An error banner outranks everything, then
/// the finished game, then whose turn it is.
pub fn headline(session: &GameSession) -> String {
    match session.phase() {
        Phase::Error { fault } => format!("Error: {fault}"),
        Phase::GameOver { outcome } => match outcome.winner() {
            Some(mark) => format!("Winner: {mark}"),
            None => "It's a Draw!".to_string(),
        },
        Phase::OpponentPending { .. } => {
            format!("Next player: {} (AI thinking...)", session.opponent_mark())
        }
        Phase::PlayerTurn => format!("Next player: {}", session.human_mark()),
    }
}

/// The opponent-knowledge line: difficulty, forecast, and learned-state
/// count, or a placeholder until the first status fetch lands.
pub fn knowledge_line(status: Option<&OpponentStatus>) -> String {
    let Some(status) = status else {
        return "Fetching AI status...".to_string();
    };
    format!(
        "Difficulty: {} (ε: {:.3}) | Efficacy: {} (V₀={:.3}) | States: {}",
        Difficulty::from_epsilon(status.epsilon),
        status.epsilon,
        Forecast::from_value(status.initial_state_value),
        status.initial_state_value,
        status.q_table_size,
    )
}

/// The running score, human side first.
pub fn score_line(score: &ScoreTally) -> String {
    format!(
        "Wins: {} | Draws: {} | Losses: {}",
        score.wins, score.draws, score.losses
    )
}
