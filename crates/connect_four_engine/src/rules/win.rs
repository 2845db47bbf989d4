//! Win detection for four-in-a-row.
//!
//! Runs are measured through a single cell, so checking the cell that was
//! just played is a bounded local scan rather than a sweep of the grid.

use crate::types::{Board, CONNECT, COLS, Marker, ROWS};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Line through a cell along which runs are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Bottom-left to top-right (`/`).
    Rising,
    /// Top-left to bottom-right (`\`).
    Falling,
}

impl Axis {
    /// Row and column step of one direction along the axis; the other
    /// direction is the negation.
    fn step(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
            Axis::Rising => (-1, 1),
            Axis::Falling => (1, 1),
        }
    }
}

/// Counts matching cells from `(row, col)` in one direction, excluding the start.
fn extend(board: &Board, row: usize, col: usize, marker: Marker, (dr, dc): (isize, isize)) -> usize {
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while (0..ROWS as isize).contains(&r)
        && (0..COLS as isize).contains(&c)
        && board.marker_at(r as usize, c as usize) == Some(marker)
    {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

/// Length of the run through `(row, col)` along `axis`, treating the center
/// cell as holding `marker` whatever it currently contains.
///
/// The center is counted once; both directions stop at the board edge or at
/// the first empty or opposing cell.
pub fn run_length(board: &Board, row: usize, col: usize, marker: Marker, axis: Axis) -> usize {
    let (dr, dc) = axis.step();
    1 + extend(board, row, col, marker, (dr, dc)) + extend(board, row, col, marker, (-dr, -dc))
}

/// Checks whether `marker` at `(row, col)` completes a run of [`CONNECT`].
#[instrument(skip(board))]
pub fn connects_through(board: &Board, row: usize, col: usize, marker: Marker) -> bool {
    Axis::iter().any(|axis| run_length(board, row, col, marker, axis) >= CONNECT)
}

/// Checks the whole board for a run of `marker`.
///
/// Cells are visited bottom row first; the first qualifying run found wins.
#[instrument(skip(board))]
pub fn has_connection(board: &Board, marker: Marker) -> bool {
    (0..ROWS).rev().any(|row| {
        (0..COLS).any(|col| {
            board.marker_at(row, col) == Some(marker) && connects_through(board, row, col, marker)
        })
    })
}

/// Returns the marker holding a run, if any.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Option<Marker> {
    Marker::iter().find(|&marker| has_connection(board, marker))
}
