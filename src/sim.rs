//! Exhibition games shown while bulk training runs.
//!
//! [`Simulation`] advances a board of its own, one ply per tick, with a
//! lightweight mover: take a completing triple most of the time, otherwise
//! play a uniformly random vacant cell. The board here never touches the
//! real game; it exists so the screen has something to show while the
//! service trains.

use crate::game::{Board, Mark, Outcome, detect_outcome};
use rand::Rng;
use std::time::Duration;

/// Time between exhibition plies.
pub const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// How long the exhibition keeps playing after training settles, so the
/// board does not vanish mid-game the instant the request returns.
pub const GRACE_PERIOD: Duration = Duration::from_millis(1200);

/// Chance the mover takes an immediately winning cell when one exists.
const WIN_TAKING_PROBABILITY: f64 = 0.85;

/// A vacant cell that would complete a triple for `mark`, if any.
fn winning_move(board: &Board, mark: Mark) -> Option<usize> {
    board.vacant_cells().into_iter().find(|&index| {
        board
            .with_move(index, mark)
            .map(|candidate| {
                matches!(
                    detect_outcome(&candidate),
                    Some(Outcome::Win { mark: winner, .. }) if winner == mark
                )
            })
            .unwrap_or(false)
    })
}

/// Self-contained exhibition game generator.
///
/// `X` opens each game, marks alternate per ply, and a finished board
/// resets to empty before the next tick runs.
#[derive(Debug)]
pub struct Simulation<R> {
    board: Board,
    mover: Mark,
    rng: R,
}

impl<R: Rng> Simulation<R> {
    /// Creates a fresh exhibition with the given source of randomness.
    pub fn new(rng: R) -> Self {
        Self {
            board: Board::new(),
            mover: Mark::X,
            rng,
        }
    }

    /// The board the next tick will play on. Never terminal: finished
    /// games reset within the tick that finished them.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plays one ply and returns the frame to display.
    ///
    /// The returned board may show a finished position for one frame;
    /// internally the game has already been cleared for the next tick.
    pub fn tick(&mut self) -> Board {
        let index = match winning_move(&self.board, self.mover) {
            Some(index) if self.rng.random::<f64>() < WIN_TAKING_PROBABILITY => index,
            _ => {
                let vacant = self.board.vacant_cells();
                vacant[self.rng.random_range(0..vacant.len())]
            }
        };
        if let Ok(next) = self.board.with_move(index, self.mover) {
            self.board = next;
        }
        let frame = self.board;
        if detect_outcome(&self.board).is_some() {
            self.board = Board::new();
            self.mover = Mark::X;
        } else {
            self.mover = self.mover.other();
        }
        frame
    }
}
