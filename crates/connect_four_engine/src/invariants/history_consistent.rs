//! History consistency invariant: the board is the replay of its moves.

use super::Invariant;
use crate::GameEngine;
use crate::types::Board;

/// Invariant: replaying the move history on an empty board reproduces the
/// current board, and every move landed on its column's landing row.
pub struct HistoryConsistentInvariant;

impl Invariant<GameEngine> for HistoryConsistentInvariant {
    fn holds(engine: &GameEngine) -> bool {
        let mut reconstructed = Board::new();

        for mov in engine.history() {
            match reconstructed.landing_row(mov.column) {
                Some(row) => reconstructed.occupy(row, mov.column, mov.marker),
                None => return false,
            }
        }

        reconstructed == *engine.board()
    }

    fn description() -> &'static str {
        "Board matches the replayed move history"
    }
}
