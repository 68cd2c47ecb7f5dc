//! Terminal-outcome detection for tic-tac-toe boards.
//!
//! Pure functions over [`Board`] snapshots. Detection reads the board and
//! nothing else, so it can be re-run on the same snapshot any number of
//! times with identical results.

use super::board::{Board, Cell, Mark};
use tracing::instrument;

/// The 8 winning triples, evaluated in fixed row, column, diagonal order.
pub const WINNING_TRIPLES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// A finished game: one mark completed a triple, or the board filled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `mark` owns all three cells of `triple`.
    Win {
        /// The winning mark.
        mark: Mark,
        /// The completed triple, in [`WINNING_TRIPLES`] order.
        triple: [usize; 3],
    },
    /// All 9 cells filled with no completed triple.
    Draw,
}

impl Outcome {
    /// Returns the winning mark, or `None` for a draw.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win { mark, .. } => Some(*mark),
            Outcome::Draw => None,
        }
    }
}

/// Evaluates a board snapshot for a terminal outcome.
///
/// Returns `None` while the game can continue. A draw is only reported once
/// every cell is filled and no triple is complete.
#[instrument(skip(board), fields(board = %board.compact()))]
pub fn detect_outcome(board: &Board) -> Option<Outcome> {
    for triple in WINNING_TRIPLES {
        let [a, b, c] = triple;
        if let Some(Cell::Occupied(mark)) = board.cell(a) {
            if board.cell(b) == board.cell(a) && board.cell(c) == board.cell(a) {
                return Some(Outcome::Win { mark, triple });
            }
        }
    }

    if board.is_full() {
        return Some(Outcome::Draw);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(cells: &str) -> Board {
        let mut board = Board::new();
        for (i, c) in cells.chars().enumerate() {
            board = match c {
                'X' => board.with_move(i, Mark::X).unwrap(),
                'O' => board.with_move(i, Mark::O).unwrap(),
                _ => board,
            };
        }
        board
    }

    #[test]
    fn test_empty_board_has_no_outcome() {
        assert_eq!(detect_outcome(&Board::new()), None);
    }

    #[test]
    fn test_win_top_row() {
        let board = board_from("XXX.OO...");
        assert_eq!(
            detect_outcome(&board),
            Some(Outcome::Win {
                mark: Mark::X,
                triple: [0, 1, 2],
            })
        );
    }

    #[test]
    fn test_win_left_column() {
        let board = board_from("XO.XO.X..");
        assert_eq!(
            detect_outcome(&board),
            Some(Outcome::Win {
                mark: Mark::X,
                triple: [0, 3, 6],
            })
        );
    }

    #[test]
    fn test_win_diagonal() {
        let board = board_from("OXX.O...O");
        assert_eq!(
            detect_outcome(&board),
            Some(Outcome::Win {
                mark: Mark::O,
                triple: [0, 4, 8],
            })
        );
    }

    #[test]
    fn test_win_anti_diagonal() {
        let board = board_from("XXO.O.OX.");
        assert_eq!(
            detect_outcome(&board),
            Some(Outcome::Win {
                mark: Mark::O,
                triple: [2, 4, 6],
            })
        );
    }

    #[test]
    fn test_incomplete_board_is_not_a_draw() {
        let board = board_from("XOX.O....");
        assert_eq!(detect_outcome(&board), None);
    }

    #[test]
    fn test_full_board_without_triple_is_a_draw() {
        // X O X / O X X / O X O
        let board = board_from("XOXOXXOXO");
        assert_eq!(detect_outcome(&board), Some(Outcome::Draw));
    }

    #[test]
    fn test_full_board_with_triple_is_a_win() {
        // X wins the bottom row of an otherwise full board.
        let board = board_from("OXOOOXXXX");
        assert_eq!(
            detect_outcome(&board),
            Some(Outcome::Win {
                mark: Mark::X,
                triple: [6, 7, 8],
            })
        );
    }

    #[test]
    fn test_detection_is_deterministic() {
        let board = board_from("XX..O.O..");
        let first = detect_outcome(&board);
        let second = detect_outcome(&board);
        assert_eq!(first, second);
    }
}
