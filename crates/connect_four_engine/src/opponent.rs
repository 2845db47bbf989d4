//! Scripted computer opponent.
//!
//! Picks a column from a read-only board snapshot: complete its own run if
//! it can, otherwise block the other marker's run, otherwise play a random
//! playable column.

use crate::action::{PlaceError, Placement};
use crate::game::GameEngine;
use crate::rules::connects_through;
use crate::types::{Board, Marker};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// First playable column, left to right, where `marker` would complete a run.
pub fn winning_column(board: &Board, marker: Marker) -> Option<usize> {
    board.playable_columns().find(|&col| {
        board
            .landing_row(col)
            .is_some_and(|row| connects_through(board, row, col, marker))
    })
}

/// Computer player bound to one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Computer ({marker})")]
pub struct ComputerOpponent {
    marker: Marker,
}

impl ComputerOpponent {
    /// Creates an opponent playing `marker`.
    pub fn new(marker: Marker) -> Self {
        Self { marker }
    }

    /// Marker this opponent plays.
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Picks a column without touching the board.
    ///
    /// Returns `None` only when no column is playable.
    #[instrument(skip(self, board, rng), fields(marker = %self.marker))]
    pub fn choose_move<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Option<usize> {
        if let Some(col) = winning_column(board, self.marker) {
            debug!(col, "Taking winning column");
            return Some(col);
        }

        if let Some(col) = winning_column(board, self.marker.opponent()) {
            debug!(col, "Blocking opponent run");
            return Some(col);
        }

        let playable: Vec<usize> = board.playable_columns().collect();
        let col = playable.choose(rng).copied();
        debug!(?col, choices = playable.len(), "Random column");
        col
    }

    /// Chooses a column and commits it through [`GameEngine::place`].
    ///
    /// # Errors
    ///
    /// [`PlaceError::GameOver`] when the game already ended or the board is full.
    #[instrument(skip(self, engine, rng), fields(marker = %self.marker))]
    pub fn play<R: Rng + ?Sized>(
        &self,
        engine: &mut GameEngine,
        rng: &mut R,
    ) -> Result<Placement, PlaceError> {
        if engine.status().is_terminal() {
            return Err(PlaceError::GameOver);
        }
        let col = self
            .choose_move(engine.board(), rng)
            .ok_or(PlaceError::GameOver)?;
        engine.place(col, self.marker)
    }
}
