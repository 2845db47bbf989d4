//! Connect Four engine - pure four-in-a-row game logic
//!
//! This crate holds everything about the game that does not touch I/O:
//! the board, the win and draw rules, the engine that owns one game, the
//! invariants the engine maintains, and a scripted computer opponent.
//!
//! # Architecture
//!
//! - **Types**: [`Board`], [`Cell`], [`Marker`] and the board dimensions
//! - **Rules**: pure win/draw detection over a board
//! - **Engine**: [`GameEngine`] applies [`Move`]s and tracks [`GameStatus`]
//! - **Invariants**: gravity and history consistency, asserted after every move
//! - **Opponent**: [`ComputerOpponent`] (win, then block, then random)
//!
//! # Example
//!
//! ```
//! use connect_four_engine::{GameEngine, GameStatus, Marker};
//!
//! let mut engine = GameEngine::new();
//! for col in 0..4 {
//!     engine.place(col, Marker::X).unwrap();
//! }
//! assert_eq!(engine.status(), GameStatus::Won(Marker::X));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
mod opponent;
mod types;

pub mod invariants;
pub mod rules;

// Crate-level exports - Board types
pub use types::{Board, COLS, CONNECT, Cell, Marker, ROWS};

// Crate-level exports - Moves and outcomes
pub use action::{GameStatus, Move, PlaceError, Placement};

// Crate-level exports - Engine
pub use game::GameEngine;

// Crate-level exports - Computer opponent
pub use opponent::{ComputerOpponent, winning_column};
