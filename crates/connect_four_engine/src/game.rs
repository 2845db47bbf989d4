//! Game engine for four-in-a-row.
//!
//! Composes the [`Board`] with the win and draw rules. Every placement is
//! evaluated immediately: a run wins, otherwise a full board draws.

use crate::action::{GameStatus, Move, PlaceError, Placement};
use crate::invariants::{EngineInvariants, InvariantSet};
use crate::rules::{connects_through, has_connection};
use crate::types::{Board, COLS, Marker, ROWS};
use tracing::{debug, instrument, warn};

/// Owns one board and the status of the game played on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameEngine {
    board: Board,
    status: GameStatus,
    history: Vec<Move>,
}

impl GameEngine {
    /// Creates an engine with an empty board.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows on the board.
    pub const fn rows() -> usize {
        ROWS
    }

    /// Number of columns on the board.
    pub const fn cols() -> usize {
        COLS
    }

    /// Read-only view of the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Moves applied since the last reset, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Drops `marker` into the zero-based `column`.
    ///
    /// Returns the landing row together with the status after the move.
    ///
    /// # Errors
    ///
    /// - [`PlaceError::GameOver`] once the game is won or drawn
    /// - [`PlaceError::ColumnOutOfRange`] for `column >= COLS`
    /// - [`PlaceError::ColumnFull`] when the column's top cell is occupied
    ///
    /// The board is untouched on error.
    #[instrument(skip(self), fields(status = ?self.status))]
    pub fn place(&mut self, column: usize, marker: Marker) -> Result<Placement, PlaceError> {
        if self.status.is_terminal() {
            warn!("Placement after game end");
            return Err(PlaceError::GameOver);
        }
        if column >= COLS {
            return Err(PlaceError::ColumnOutOfRange(column));
        }
        let row = self
            .board
            .landing_row(column)
            .ok_or(PlaceError::ColumnFull(column))?;

        self.board.occupy(row, column, marker);
        self.history.push(Move::new(column, marker));

        self.status = if connects_through(&self.board, row, column, marker) {
            GameStatus::Won(marker)
        } else if self.board.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        };

        debug_assert!(
            EngineInvariants::check_all(self).is_ok(),
            "engine invariants violated after placing {marker} in column {column}"
        );
        debug!(row, status = ?self.status, "Piece placed");

        Ok(Placement {
            row,
            column,
            marker,
            status: self.status,
        })
    }

    /// Same as [`place`](Self::place) with the 1-based column label shown to players.
    #[instrument(skip(self))]
    pub fn place_label(&mut self, label: usize, marker: Marker) -> Result<Placement, PlaceError> {
        self.place(label.wrapping_sub(1), marker)
    }

    /// Checks the whole board for a run of `marker`.
    #[instrument(skip(self))]
    pub fn has_connection(&self, marker: Marker) -> bool {
        has_connection(&self.board, marker)
    }

    /// Checks whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    /// Clears the board and starts a new game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!(moves = self.history.len(), "Resetting engine");
        self.board.reset();
        self.status = GameStatus::InProgress;
        self.history.clear();
    }
}
