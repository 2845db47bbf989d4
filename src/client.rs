//! Client side of the relay protocol.
//!
//! [`ClientSessionAgent`] owns the connection and a mirror of the board.
//! It runs on its own task: the front end sends chosen columns over an
//! `mpsc` channel and receives [`ClientEvent`]s back.

use crate::error::NetError;
use crate::protocol::{self, Outcome, Role, START_SIGNAL, WireMove};
use connect_four_engine::{Board, GameEngine, PlaceError, Placement};
use derive_more::Display;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader, ReadHalf, WriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Final result of a networked game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Verdict {
    /// Local player completed a run.
    #[display("You won!")]
    Won,
    /// Opponent completed a run.
    #[display("Your opponent has won")]
    Lost,
    /// Board filled without a run.
    #[display("The game has ended in a draw")]
    Draw,
    /// Session ended without a result.
    #[display("The session was aborted")]
    Aborted,
}

impl Verdict {
    /// Verdict for `role` given a terminal outcome.
    pub fn for_role(outcome: Outcome, role: Role) -> Self {
        match outcome {
            Outcome::Draw => Verdict::Draw,
            Outcome::Aborted | Outcome::Continue => Verdict::Aborted,
            win if win == Outcome::win_for(role) => Verdict::Won,
            _ => Verdict::Lost,
        }
    }
}

/// Progress reported to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Server assigned a role.
    RoleAssigned(Role),
    /// First mover is waiting for an opponent.
    WaitingForOpponent,
    /// Opponent joined; the first mover may start.
    OpponentJoined,
    /// Local player should choose a column.
    YourTurn,
    /// Local board refused the chosen column; choose again.
    MoveRejected(PlaceError),
    /// Local move was sent.
    MovePlayed(Placement),
    /// Opponent's move was applied to the local board.
    OpponentMoved(Placement),
    /// Game is over.
    Finished(Verdict),
    /// Connection failed before a verdict; carries the error text.
    Failed(String),
}

/// What the agent expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    MyTurn,
    TheirTurn,
    AwaitVerdict,
}

/// Plays one networked game.
pub struct ClientSessionAgent<S> {
    role: Role,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    engine: GameEngine,
}

impl ClientSessionAgent<TcpStream> {
    /// Connects to a relay server and waits for the role assignment.
    #[instrument(skip(addr))]
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, NetError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(server = ?stream.peer_addr().ok(), "Connected to relay server");
        Self::join(stream).await
    }
}

impl<S> ClientSessionAgent<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads the role code from an established connection.
    #[instrument(skip(stream))]
    pub async fn join(stream: S) -> Result<Self, NetError> {
        let (reader, writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);
        let code = protocol::read_code(&mut reader).await.map_err(closed)?;
        let role = Role::from_code(code)?;
        info!(%role, "Role assigned");
        Ok(Self {
            role,
            reader,
            writer,
            engine: GameEngine::new(),
        })
    }

    /// Role assigned by the server.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Local mirror of the board.
    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    /// Plays the game to its end.
    ///
    /// Columns (zero-based) are taken from `moves` only when it is the local
    /// player's turn. A column the local board refuses is reported as
    /// [`ClientEvent::MoveRejected`] and another one is awaited.
    ///
    /// # Errors
    ///
    /// - [`NetError::ServerClosed`] when the connection drops mid-game
    /// - [`NetError::InputClosed`] when `moves` closes on the local turn
    /// - [`NetError::Desync`] when a relayed move does not fit the local board
    ///
    /// Every error is also reported as [`ClientEvent::Failed`] before returning.
    #[instrument(skip_all, fields(role = %self.role))]
    pub async fn run(
        mut self,
        mut moves: mpsc::Receiver<usize>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Result<Verdict, NetError> {
        match self.play_out(&mut moves, &events).await {
            Ok(verdict) => Ok(verdict),
            Err(err) => {
                warn!(error = %err, "Client session failed");
                emit(&events, ClientEvent::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn play_out(
        &mut self,
        moves: &mut mpsc::Receiver<usize>,
        events: &mpsc::UnboundedSender<ClientEvent>,
    ) -> Result<Verdict, NetError> {
        emit(events, ClientEvent::RoleAssigned(self.role));

        let mut step = match self.role {
            Role::FirstMover => {
                emit(events, ClientEvent::WaitingForOpponent);
                let code = protocol::read_code(&mut self.reader).await.map_err(closed)?;
                if code != START_SIGNAL {
                    return self.conclude(Outcome::from_code(code)?, events);
                }
                emit(events, ClientEvent::OpponentJoined);
                Step::MyTurn
            }
            Role::SecondMover => Step::TheirTurn,
        };

        loop {
            step = match step {
                Step::MyTurn => {
                    emit(events, ClientEvent::YourTurn);
                    match self.next_move(moves).await? {
                        Some(column) => match self.play(column).await? {
                            Ok(placement) => {
                                emit(events, ClientEvent::MovePlayed(placement));
                                if placement.status.is_terminal() {
                                    Step::AwaitVerdict
                                } else {
                                    Step::TheirTurn
                                }
                            }
                            Err(err) => {
                                debug!(error = %err, "Local board refused column");
                                emit(events, ClientEvent::MoveRejected(err));
                                Step::MyTurn
                            }
                        },
                        // Server spoke during our turn; only an abort can arrive here.
                        None => Step::AwaitVerdict,
                    }
                }
                Step::TheirTurn => {
                    let outcome = self.read_outcome().await?;
                    if outcome == Outcome::Aborted {
                        return self.conclude(outcome, events);
                    }
                    let placement = self.receive_move().await?;
                    emit(events, ClientEvent::OpponentMoved(placement));
                    if outcome.is_terminal() {
                        return self.conclude(outcome, events);
                    }
                    Step::MyTurn
                }
                Step::AwaitVerdict => {
                    let outcome = self.read_outcome().await?;
                    return self.conclude(outcome, events);
                }
            };
        }
    }

    /// Waits for a local column, or returns `None` if the server sends first.
    async fn next_move(&mut self, moves: &mut mpsc::Receiver<usize>) -> Result<Option<usize>, NetError> {
        tokio::select! {
            column = moves.recv() => column.map(Some).ok_or(NetError::InputClosed),
            ready = self.reader.fill_buf() => match ready {
                Ok(buf) if buf.is_empty() => Err(NetError::ServerClosed),
                Ok(_) => Ok(None),
                Err(err) => Err(closed(NetError::Io(err))),
            },
        }
    }

    /// Applies a local move and sends it. The outer error is fatal, the inner one is not.
    async fn play(&mut self, column: usize) -> Result<Result<Placement, PlaceError>, NetError> {
        let placement = match self.engine.place(column, self.role.marker()) {
            Ok(placement) => placement,
            Err(err) => return Ok(Err(err)),
        };
        protocol::write_move(&mut self.writer, WireMove::from(placement))
            .await
            .map_err(closed)?;
        debug!(row = placement.row, column, "Move sent");
        Ok(Ok(placement))
    }

    async fn read_outcome(&mut self) -> Result<Outcome, NetError> {
        let code = protocol::read_code(&mut self.reader).await.map_err(closed)?;
        Outcome::from_code(code)
    }

    /// Reads the opponent's move and mirrors it on the local board.
    async fn receive_move(&mut self) -> Result<Placement, NetError> {
        let wire = protocol::read_move(&mut self.reader).await.map_err(closed)?;
        let placement = self
            .engine
            .place(wire.column_index(), self.role.other().marker())
            .map_err(|err| NetError::Desync(format!("opponent move {:?} refused: {}", wire, err)))?;
        if WireMove::from(placement).row != wire.row {
            warn!(reported = wire.row, actual = placement.row, "Opponent row differs from local board");
        }
        debug!(row = placement.row, column = placement.column, "Opponent move applied");
        Ok(placement)
    }

    fn conclude(
        &self,
        outcome: Outcome,
        events: &mpsc::UnboundedSender<ClientEvent>,
    ) -> Result<Verdict, NetError> {
        let verdict = Verdict::for_role(outcome, self.role);
        info!(%verdict, moves = self.engine.history().len(), "Game finished");
        emit(events, ClientEvent::Finished(verdict));
        Ok(verdict)
    }
}

/// Maps a dropped connection to [`NetError::ServerClosed`].
fn closed(err: NetError) -> NetError {
    if err.is_disconnect() {
        NetError::ServerClosed
    } else {
        err
    }
}

fn emit(events: &mpsc::UnboundedSender<ClientEvent>, event: ClientEvent) {
    if let Err(dropped) = events.send(event) {
        debug!(event = ?dropped.0, "Event receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_for_role() {
        assert_eq!(
            Verdict::for_role(Outcome::FirstMoverWin, Role::FirstMover),
            Verdict::Won
        );
        assert_eq!(
            Verdict::for_role(Outcome::FirstMoverWin, Role::SecondMover),
            Verdict::Lost
        );
        assert_eq!(Verdict::for_role(Outcome::Draw, Role::SecondMover), Verdict::Draw);
        assert_eq!(
            Verdict::for_role(Outcome::Aborted, Role::FirstMover),
            Verdict::Aborted
        );
    }
}
