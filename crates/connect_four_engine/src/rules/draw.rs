//! Draw detection for four-in-a-row.

use super::win::winner;
use crate::types::Board;
use tracing::instrument;

/// Checks if the board is full (every cell occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// A full board with no run for either marker.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWN: [&str; 6] = [
        "OXOOOXX",
        "XOXXXOO",
        "OXXOOXX",
        "XOOXOXO",
        "OXXOOOX",
        "OXOOXXX",
    ];

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
        assert!(!is_draw(&Board::new()));
    }

    #[test]
    fn test_full_board_without_run_is_draw() {
        let board = Board::from_rows(DRAWN);
        assert!(is_full(&board));
        assert!(is_draw(&board));
    }

    #[test]
    fn test_full_board_with_run_is_not_draw() {
        let mut rows = DRAWN;
        rows[5] = "XXXXOOO";
        let board = Board::from_rows(rows);
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_partial_board_not_draw() {
        let mut rows = DRAWN;
        rows[0] = "OXOOOX ";
        let board = Board::from_rows(rows);
        assert!(!is_full(&board));
        assert!(!is_draw(&board));
    }
}
