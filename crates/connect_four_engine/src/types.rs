//! Core domain types for four-in-a-row.

use serde::{Deserialize, Serialize};

/// Number of rows on the board. Row 0 is the top row.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Run length needed to win.
pub const CONNECT: usize = 4;

/// Marker placed by a player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Marker {
    /// Marker of the first mover.
    #[display("X")]
    X,
    /// Marker of the second mover.
    #[display("O")]
    O,
}

impl Marker {
    /// Returns the other marker.
    pub fn opponent(self) -> Self {
        match self {
            Marker::X => Marker::O,
            Marker::O => Marker::X,
        }
    }

    /// Character used when rendering the board as text.
    pub fn symbol(self) -> char {
        match self {
            Marker::X => 'X',
            Marker::O => 'O',
        }
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No piece.
    #[default]
    Empty,
    /// Cell holds a piece.
    Occupied(Marker),
}

/// Fixed 6x7 grid of cells.
///
/// Pieces obey gravity: in every column the occupied cells form a
/// contiguous stack starting at the bottom row (`ROWS - 1`). The board
/// itself does not enforce this; [`GameEngine`](crate::GameEngine) is the
/// only writer and always places into [`Board::landing_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        ROWS
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        COLS
    }

    /// Returns the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Returns the marker at `(row, col)`, or `None` for an empty cell.
    pub fn marker_at(&self, row: usize, col: usize) -> Option<Marker> {
        match self.cells[row][col] {
            Cell::Empty => None,
            Cell::Occupied(marker) => Some(marker),
        }
    }

    /// Checks whether the cell at `(row, col)` is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        self.cells[row][col] == Cell::Empty
    }

    /// Sets a cell without validation.
    ///
    /// Callers must already have checked that the coordinates are in range
    /// and that `row` is the landing row of `col`.
    pub(crate) fn occupy(&mut self, row: usize, col: usize, marker: Marker) {
        self.cells[row][col] = Cell::Occupied(marker);
    }

    /// Clears every cell.
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; COLS]; ROWS];
    }

    /// Lowest empty row in `col`, or `None` when the column is full or out of range.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.is_empty(row, col))
    }

    /// Checks whether `col` can no longer accept a piece.
    ///
    /// Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= COLS || !self.is_empty(0, col)
    }

    /// Columns that still accept a piece, left to right.
    pub fn playable_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLS).filter(|&col| !self.is_column_full(col))
    }

    /// Checks whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Formats the board as text, top row first, with a 1-based column ruler.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in &self.cells {
            for cell in row {
                result.push('|');
                result.push(match cell {
                    Cell::Empty => ' ',
                    Cell::Occupied(marker) => marker.symbol(),
                });
            }
            result.push_str("|\n");
        }
        for col in 1..=COLS {
            result.push(' ');
            result.push_str(&col.to_string());
        }
        result.push('\n');
        result
    }

    /// Builds a board from text rows, top row first (`X`, `O`, anything else empty).
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; ROWS]) -> Self {
        let mut board = Self::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, symbol) in line.chars().take(COLS).enumerate() {
                match symbol {
                    'X' => board.occupy(row, col, Marker::X),
                    'O' => board.occupy(row, col, Marker::O),
                    _ => {}
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert!(board.is_empty(row, col));
                assert_eq!(board.marker_at(row, col), None);
            }
        }
        assert_eq!(board.occupied(), 0);
        assert!(!board.is_full());
    }

    #[test]
    fn test_landing_row_stacks_upward() {
        let mut board = Board::new();
        assert_eq!(board.landing_row(3), Some(ROWS - 1));
        board.occupy(ROWS - 1, 3, Marker::X);
        assert_eq!(board.landing_row(3), Some(ROWS - 2));
    }

    #[test]
    fn test_landing_row_out_of_range() {
        let board = Board::new();
        assert_eq!(board.landing_row(COLS), None);
        assert!(board.is_column_full(COLS));
    }

    #[test]
    fn test_playable_columns_skip_full() {
        let mut board = Board::new();
        for row in 0..ROWS {
            board.occupy(row, 2, Marker::O);
        }
        let playable: Vec<_> = board.playable_columns().collect();
        assert_eq!(playable, vec![0, 1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut board = Board::from_rows([
            "", "", "", "", "", "XOXOXOX",
        ]);
        assert_eq!(board.occupied(), COLS);
        board.reset();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_display_matches_console_layout() {
        let board = Board::from_rows(["", "", "", "", "", "X     O"]);
        let text = board.display();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[0], "| | | | | | | |");
        assert_eq!(lines[ROWS - 1], "|X| | | | | |O|");
        assert_eq!(lines[ROWS], " 1 2 3 4 5 6 7");
    }

    #[test]
    fn test_marker_opponent() {
        assert_eq!(Marker::X.opponent(), Marker::O);
        assert_eq!(Marker::O.opponent(), Marker::X);
        assert_eq!(Marker::X.to_string(), "X");
    }
}
