//! Gravity invariant: no floating pieces.

use super::Invariant;
use crate::GameEngine;
use crate::types::{Board, COLS, ROWS};

/// Invariant: every column is a contiguous stack from the bottom row up.
///
/// Scanning a column bottom to top, once an empty cell is seen every cell
/// above it must be empty too.
pub struct GravityInvariant;

impl Invariant<Board> for GravityInvariant {
    fn holds(board: &Board) -> bool {
        (0..COLS).all(|col| {
            let mut gap = false;
            (0..ROWS).rev().all(|row| {
                if board.is_empty(row, col) {
                    gap = true;
                    true
                } else {
                    !gap
                }
            })
        })
    }

    fn description() -> &'static str {
        "Columns are filled bottom-up without gaps"
    }
}

impl Invariant<GameEngine> for GravityInvariant {
    fn holds(engine: &GameEngine) -> bool {
        <Self as Invariant<Board>>::holds(engine.board())
    }

    fn description() -> &'static str {
        <Self as Invariant<Board>>::description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Marker;

    #[test]
    fn test_empty_board_holds() {
        assert!(<GravityInvariant as Invariant<Board>>::holds(&Board::new()));
    }

    #[test]
    fn test_stacked_board_holds() {
        let board = Board::from_rows(["", "", "", " O", " X", "XOX"]);
        assert!(<GravityInvariant as Invariant<Board>>::holds(&board));
    }

    #[test]
    fn test_floating_piece_violates() {
        let mut board = Board::new();
        board.occupy(2, 4, Marker::X);
        assert!(!<GravityInvariant as Invariant<Board>>::holds(&board));
    }

    #[test]
    fn test_gap_in_column_violates() {
        let board = Board::from_rows(["", "", "", "X", "", "O"]);
        assert!(!<GravityInvariant as Invariant<Board>>::holds(&board));
    }
}
