//! Game rules for four-in-a-row.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart from
//! board storage so the engine, the computer opponent and the invariants
//! can all evaluate positions the same way.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{Axis, connects_through, has_connection, run_length, winner};
