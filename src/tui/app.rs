//! Application state for the terminal client.

use connect_four::{ClientEvent, Role, Verdict};
use connect_four_engine::{Board, COLS, GameEngine, Placement};
use tracing::{debug, warn};

/// Main application state.
///
/// Mirrors the board from the agent's events so rendering never touches the
/// network task.
pub struct App {
    engine: GameEngine,
    role: Option<Role>,
    cursor: usize,
    my_turn: bool,
    verdict: Option<Verdict>,
    failed: bool,
    status_message: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates a new application.
    pub fn new() -> Self {
        Self {
            engine: GameEngine::new(),
            role: None,
            cursor: COLS / 2,
            my_turn: false,
            verdict: None,
            failed: false,
            status_message: "Connecting...".to_string(),
        }
    }

    /// Mirrored board.
    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    /// Column under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Role assigned by the server, once known.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Checks whether the local player may drop a piece.
    pub fn my_turn(&self) -> bool {
        self.my_turn
    }

    /// Final verdict, once the game is over.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Checks whether the connection failed before a verdict.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Gets the current status message.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Handles an event from the client agent.
    pub fn handle_event(&mut self, event: ClientEvent) {
        debug!(?event, "Handling client event");

        match event {
            ClientEvent::RoleAssigned(role) => {
                self.role = Some(role);
                self.status_message = format!("You are the {} ({})", role, role.marker());
            }
            ClientEvent::WaitingForOpponent => {
                self.status_message = "Waiting for an opponent to join".to_string();
            }
            ClientEvent::OpponentJoined => {
                self.status_message = "Opponent has joined. You start first".to_string();
            }
            ClientEvent::YourTurn => {
                self.my_turn = true;
                self.status_message = "Your turn".to_string();
            }
            ClientEvent::MoveRejected(err) => {
                self.my_turn = true;
                self.status_message = format!("{}. Choose another column", err);
            }
            ClientEvent::MovePlayed(placement) => {
                self.mirror(placement);
                self.my_turn = false;
                self.status_message = "Waiting for opponent to move".to_string();
            }
            ClientEvent::OpponentMoved(placement) => {
                self.mirror(placement);
                self.status_message = format!("Opponent played column {}", placement.column + 1);
            }
            ClientEvent::Finished(verdict) => {
                self.my_turn = false;
                self.verdict = Some(verdict);
                self.status_message = format!("{}. Press 'q' to quit.", verdict);
            }
            ClientEvent::Failed(reason) => {
                self.my_turn = false;
                self.failed = true;
                self.status_message = format!("Connection error: {}. Press 'q' to quit.", reason);
            }
        }
    }

    fn mirror(&mut self, placement: Placement) {
        if let Err(err) = self.engine.place(placement.column, placement.marker) {
            warn!(error = %err, ?placement, "Mirror refused placement");
        }
    }

    /// Moves the cursor one column left, wrapping around.
    pub fn move_left(&mut self) {
        self.cursor = (self.cursor + COLS - 1) % COLS;
    }

    /// Moves the cursor one column right, wrapping around.
    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1) % COLS;
    }

    /// Puts the cursor on the column with 1-based `label`.
    ///
    /// Returns `false` and leaves the cursor alone when `label` names no column.
    pub fn select_label(&mut self, label: usize) -> bool {
        if !(1..=COLS).contains(&label) {
            debug!(label, "Ignoring column label off the board");
            return false;
        }
        self.cursor = label - 1;
        true
    }

    /// Column to send, if the local player may move now.
    ///
    /// Clears the turn flag so a second key press cannot queue another move.
    pub fn commit(&mut self) -> Option<usize> {
        if !self.my_turn {
            return None;
        }
        self.my_turn = false;
        self.status_message = format!("Dropping into column {}", self.cursor + 1);
        Some(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four_engine::{GameStatus, Marker, ROWS};

    #[test]
    fn test_commit_only_on_turn() {
        let mut app = App::new();
        assert_eq!(app.commit(), None);
        app.handle_event(ClientEvent::YourTurn);
        assert!(app.select_label(2));
        assert_eq!(app.commit(), Some(1));
        assert_eq!(app.commit(), None);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut app = App::new();
        app.select_label(1);
        app.move_left();
        assert_eq!(app.cursor(), COLS - 1);
        app.move_right();
        assert_eq!(app.cursor(), 0);
        assert!(!app.select_label(0));
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn test_off_board_label_keeps_turn() {
        let mut app = App::new();
        app.handle_event(ClientEvent::YourTurn);
        assert!(app.select_label(3));
        for label in [0, 8, 9] {
            assert!(!app.select_label(label));
        }
        assert_eq!(app.cursor(), 2);
        assert!(app.my_turn());
    }

    #[test]
    fn test_failure_ends_turn() {
        let mut app = App::new();
        app.handle_event(ClientEvent::YourTurn);
        app.handle_event(ClientEvent::Failed("Server closed the connection".to_string()));
        assert!(app.failed());
        assert!(!app.my_turn());
        assert_eq!(app.verdict(), None);
        assert!(app.status_message().contains("Server closed the connection"));
        assert_eq!(app.commit(), None);
    }

    #[test]
    fn test_events_mirror_board() {
        let mut app = App::new();
        app.handle_event(ClientEvent::RoleAssigned(Role::SecondMover));
        app.handle_event(ClientEvent::OpponentMoved(Placement {
            row: ROWS - 1,
            column: 3,
            marker: Marker::X,
            status: GameStatus::InProgress,
        }));
        assert_eq!(app.board().marker_at(ROWS - 1, 3), Some(Marker::X));

        app.handle_event(ClientEvent::Finished(Verdict::Aborted));
        assert_eq!(app.verdict(), Some(Verdict::Aborted));
        assert!(!app.my_turn());
    }
}
