//! First-class move types for four-in-a-row.
//!
//! A move names only a column and a marker. The row is always derived from
//! the board, so callers can never describe a floating piece.

use crate::types::{COLS, Marker};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A marker dropped into a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Zero-based column.
    pub column: usize,
    /// Marker being dropped.
    pub marker: Marker,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(column: usize, marker: Marker) -> Self {
        Self { column, marker }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> column {}", self.marker, self.column + 1)
    }
}

/// Status of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are still accepted.
    #[default]
    InProgress,
    /// A marker completed a run.
    Won(Marker),
    /// The board filled without a run.
    Draw,
}

impl GameStatus {
    /// True once the game accepts no further moves.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Winning marker, if any.
    pub fn winner(self) -> Option<Marker> {
        match self {
            GameStatus::Won(marker) => Some(marker),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }
}

/// Result of a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Landing row (0 is the top row).
    pub row: usize,
    /// Zero-based column.
    pub column: usize,
    /// Marker that was placed.
    pub marker: Marker,
    /// Game status right after the placement.
    pub status: GameStatus,
}

/// Why a move was refused. A refused move never changes the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlaceError {
    /// Column index outside the board. Label 0 arrives here as `usize::MAX`.
    #[display("Column {} is out of range (choose 1-{})", _0.wrapping_add(1), COLS)]
    ColumnOutOfRange(usize),

    /// Column has no empty cell left.
    #[display("Column {} is full", _0.wrapping_add(1))]
    ColumnFull(usize),

    /// The game already ended.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for PlaceError {}
