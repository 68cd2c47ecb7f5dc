//! Pure game logic: board snapshots and outcome detection.

mod board;
mod outcome;

pub use board::{Board, Cell, InvalidMove, Mark};
pub use outcome::{Outcome, WINNING_TRIPLES, detect_outcome};
