//! Core board types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A player's mark. `X` is the human side, `O` the remote opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// The human player's mark.
    X,
    /// The opponent service's mark.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// One cell of the 3x3 grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// No mark placed yet.
    #[default]
    Empty,
    /// Cell claimed by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the occupying mark, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }
}

/// Rejected move: the index missed the grid or the cell was taken.
///
/// The orchestrator's input gate filters user clicks before they reach the
/// board, so this error reaching a user indicates a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum InvalidMove {
    /// Index outside the 9-cell grid.
    #[display("cell index {index} is out of range")]
    OutOfRange {
        /// The offending index.
        index: usize,
    },
    /// Cell already holds a mark.
    #[display("cell {index} is already occupied")]
    Occupied {
        /// The offending index.
        index: usize,
    },
}

/// The 3x3 grid in row-major order.
///
/// `Board` is a small `Copy` value. A committed move never mutates in
/// place: [`Board::with_move`] returns a fresh snapshot, so an async
/// callback can keep the exact board that justified its request and compare
/// it against live state later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at `index`, or `None` if the index is off the grid.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks whether the cell at `index` is on the grid and unclaimed.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.cell(index), Some(Cell::Empty))
    }

    /// Checks whether no mark has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| *c == Cell::Empty)
    }

    /// Checks whether every cell is claimed.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Returns the indices of unclaimed cells.
    pub fn vacant_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns a new snapshot with `mark` placed at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove`] if `index` is off the grid or the cell is
    /// already occupied. The receiver is left untouched either way.
    pub fn with_move(self, index: usize, mark: Mark) -> Result<Self, InvalidMove> {
        if index >= 9 {
            return Err(InvalidMove::OutOfRange { index });
        }
        if self.cells[index] != Cell::Empty {
            return Err(InvalidMove::Occupied { index });
        }
        let mut next = self;
        next.cells[index] = Cell::Occupied(mark);
        Ok(next)
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Formats the board as a compact single-line string for logs.
    pub fn compact(&self) -> String {
        self.cells
            .iter()
            .map(|c| match c {
                Cell::Empty => '.',
                Cell::Occupied(Mark::X) => 'X',
                Cell::Occupied(Mark::O) => 'O',
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert!(!board.is_full());
        assert_eq!(board.vacant_cells().len(), 9);
    }

    #[test]
    fn test_with_move_returns_new_snapshot() {
        let board = Board::new();
        let next = board.with_move(4, Mark::X).expect("valid move");

        // Original snapshot is untouched.
        assert!(board.is_vacant(4));
        assert_eq!(next.cell(4), Some(Cell::Occupied(Mark::X)));
        assert_eq!(next.vacant_cells().len(), 8);
    }

    #[test]
    fn test_with_move_rejects_occupied_cell() {
        let board = Board::new().with_move(0, Mark::X).unwrap();
        let result = board.with_move(0, Mark::O);
        assert_eq!(result, Err(InvalidMove::Occupied { index: 0 }));
    }

    #[test]
    fn test_with_move_rejects_out_of_range() {
        let board = Board::new();
        let result = board.with_move(9, Mark::X);
        assert_eq!(result, Err(InvalidMove::OutOfRange { index: 9 }));
    }

    #[test]
    fn test_compact_rendering() {
        let board = Board::new()
            .with_move(0, Mark::O)
            .unwrap()
            .with_move(4, Mark::X)
            .unwrap();
        assert_eq!(board.compact(), "O...X....");
    }
}
