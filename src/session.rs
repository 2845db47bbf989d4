//! Server-side pairing and per-session turn exchange.
//!
//! The [`Lobby`] pairs connections first come, first served and hands each
//! complete pair to a [`SessionCoordinator`], which owns the authoritative
//! engine for that game and relays moves between the two peers.

use crate::error::NetError;
use crate::protocol::{self, Outcome, Role, START_SIGNAL, WireMove};
use connect_four_engine::{GameEngine, GameStatus, PlaceError};
use derive_more::Display;
use derive_new::new;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader, ReadBuf, ReadHalf, WriteHalf};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a session.
pub type SessionId = u64;

/// Where a session is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SessionPhase {
    /// Nobody is waiting for an opponent.
    #[display("awaiting first player")]
    AwaitingFirstPlayer,
    /// One peer holds the first-mover role and waits for an opponent.
    #[display("awaiting second player")]
    AwaitingSecondPlayer,
    /// Both roles are assigned; the start signal is not sent yet.
    #[display("roles assigned")]
    AssignedRoles,
    /// Waiting for the first mover's move.
    #[display("first mover's turn")]
    TurnFirstMover,
    /// Waiting for the second mover's move.
    #[display("second mover's turn")]
    TurnSecondMover,
    /// Session is over; no further moves are read.
    #[display("terminated")]
    Terminated,
}

impl SessionPhase {
    fn turn_of(role: Role) -> Self {
        match role {
            Role::FirstMover => SessionPhase::TurnFirstMover,
            Role::SecondMover => SessionPhase::TurnSecondMover,
        }
    }
}

/// Why a session ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AbortReason {
    /// The peer's connection closed or failed.
    #[display("{} disconnected", _0)]
    Disconnected(Role),
    /// The mover missed the per-turn deadline.
    #[display("{} ran out of time", _0)]
    TurnTimeout(Role),
    /// The idle peer sent data while it was not its turn.
    #[display("{} sent data out of turn", _0)]
    OutOfTurn(Role),
    /// The mover named a column the board refuses.
    #[display("{} played an illegal move: {}", _0, _1)]
    IllegalMove(Role, PlaceError),
    /// The server is shutting down.
    #[display("server shutdown")]
    Shutdown,
}

impl AbortReason {
    /// Peer known to be unreachable, if any.
    fn lost_peer(self) -> Option<Role> {
        match self {
            AbortReason::Disconnected(role) => Some(role),
            _ => None,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionEnd {
    /// A peer completed a run.
    #[display("{} won", _0)]
    Won(Role),
    /// The board filled without a run.
    #[display("draw")]
    Draw,
    /// The session ended without a result.
    #[display("aborted ({})", _0)]
    Aborted(AbortReason),
}

/// Summary returned when a session task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct SessionReport {
    /// Session identifier.
    pub id: SessionId,
    /// How the session ended.
    pub end: SessionEnd,
    /// Moves accepted on the authoritative board.
    pub moves: usize,
}

// ─────────────────────────────────────────────────────────────
//  Lobby
// ─────────────────────────────────────────────────────────────

/// Pairs incoming connections into sessions.
///
/// The first connection of a pair is told it is the first mover and parked.
/// The next connection is told it is the second mover and both are handed
/// to a new [`SessionCoordinator`].
#[derive(Debug)]
pub struct Lobby<S> {
    waiting: Option<S>,
    next_id: SessionId,
    turn_timeout: Option<Duration>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<S> Default for Lobby<S> {
    fn default() -> Self {
        Self {
            waiting: None,
            next_id: 1,
            turn_timeout: None,
            shutdown: None,
        }
    }
}

impl<S> Lobby<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates an empty lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-turn deadline handed to every new session.
    pub fn with_turn_timeout(mut self, turn_timeout: Option<Duration>) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    /// Sets the shutdown signal handed to every new session.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Current pairing phase.
    pub fn phase(&self) -> SessionPhase {
        if self.waiting.is_some() {
            SessionPhase::AwaitingSecondPlayer
        } else {
            SessionPhase::AwaitingFirstPlayer
        }
    }

    /// Admits a new connection and assigns its role.
    ///
    /// Returns a coordinator once a pair is complete.
    ///
    /// # Errors
    ///
    /// Fails when the role code cannot be written. The failing connection
    /// is dropped; a parked first mover stays parked.
    ///
    /// A parked first mover that has hung up, or sent bytes before the start
    /// signal, is discarded and the new arrival takes its place.
    #[instrument(skip(self, stream), fields(phase = %self.phase()))]
    pub async fn admit(&mut self, mut stream: S) -> Result<Option<SessionCoordinator<S>>, NetError> {
        let parked = match self.waiting.take() {
            Some(mut first) => {
                if still_waiting(&mut first).await {
                    Some(first)
                } else {
                    info!("Parked first mover is gone, re-queuing arrival");
                    None
                }
            }
            None => None,
        };

        match parked {
            None => {
                protocol::write_code(&mut stream, Role::FirstMover.code()).await?;
                info!("First mover connected, waiting for opponent");
                self.waiting = Some(stream);
                Ok(None)
            }
            Some(first) => {
                if let Err(err) = protocol::write_code(&mut stream, Role::SecondMover.code()).await {
                    self.waiting = Some(first);
                    return Err(err);
                }
                let id = self.next_id;
                self.next_id += 1;
                info!(session_id = id, "Second mover connected, session paired");

                let mut coordinator = SessionCoordinator::new(id, first, stream)
                    .with_turn_timeout(self.turn_timeout);
                if let Some(shutdown) = &self.shutdown {
                    coordinator = coordinator.with_shutdown(shutdown.clone());
                }
                Ok(Some(coordinator))
            }
        }
    }
}

/// Checks a parked connection without waiting on it.
///
/// A parked peer has nothing to say before the start signal, so any ready
/// read (EOF, error or stray bytes) disqualifies it.
async fn still_waiting<S: AsyncRead + Unpin>(stream: &mut S) -> bool {
    std::future::poll_fn(|cx| {
        let mut byte = [0u8; 1];
        let mut buf = ReadBuf::new(&mut byte);
        match Pin::new(&mut *stream).poll_read(cx, &mut buf) {
            Poll::Pending => Poll::Ready(true),
            Poll::Ready(Ok(())) if buf.filled().is_empty() => Poll::Ready(false),
            Poll::Ready(Ok(())) => {
                warn!("Parked first mover sent data before the start signal");
                Poll::Ready(false)
            }
            Poll::Ready(Err(err)) => {
                debug!(error = %err, "Parked first mover failed");
                Poll::Ready(false)
            }
        }
    })
    .await
}

// ─────────────────────────────────────────────────────────────
//  Session coordinator
// ─────────────────────────────────────────────────────────────

/// One connected peer.
struct Seat<S> {
    role: Role,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
}

impl<S: AsyncRead + AsyncWrite> Seat<S> {
    fn new(role: Role, stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            role,
            reader: BufReader::new(reader),
            writer,
        }
    }
}

/// Runs one paired game to completion.
pub struct SessionCoordinator<S> {
    id: SessionId,
    engine: GameEngine,
    phase: SessionPhase,
    first: Seat<S>,
    second: Seat<S>,
    turn_timeout: Option<Duration>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<S> std::fmt::Debug for SessionCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("moves", &self.engine.history().len())
            .finish()
    }
}

impl<S> SessionCoordinator<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a coordinator for two peers whose role codes were already sent.
    pub fn new(id: SessionId, first: S, second: S) -> Self {
        Self {
            id,
            engine: GameEngine::new(),
            phase: SessionPhase::AssignedRoles,
            first: Seat::new(Role::FirstMover, first),
            second: Seat::new(Role::SecondMover, second),
            turn_timeout: None,
            shutdown: None,
        }
    }

    /// Aborts the session when a mover takes longer than `turn_timeout`.
    pub fn with_turn_timeout(mut self, turn_timeout: Option<Duration>) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    /// Aborts the session once `shutdown` turns true.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Sends the start signal and relays moves until the game ends.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub async fn run(mut self) -> SessionReport {
        if protocol::write_code(&mut self.first.writer, START_SIGNAL).await.is_err() {
            return self.abort(AbortReason::Disconnected(Role::FirstMover)).await;
        }
        info!("Start signal sent");

        let mut mover = Role::FirstMover;
        loop {
            self.phase = SessionPhase::turn_of(mover);
            debug!(phase = %self.phase, "Awaiting move");

            let wire = match self.await_move(mover).await {
                Ok(wire) => wire,
                Err(reason) => return self.abort(reason).await,
            };

            let placement = match self.engine.place(wire.column_index(), mover.marker()) {
                Ok(placement) => placement,
                Err(err) => return self.abort(AbortReason::IllegalMove(mover, err)).await,
            };
            let relayed = WireMove::from(placement);
            if relayed.row != wire.row {
                warn!(
                    reported = wire.row,
                    actual = relayed.row,
                    column = relayed.column,
                    "Reported row differs from landing row"
                );
            }
            info!(%mover, row = relayed.row, column = relayed.column, "Move accepted");

            let outcome = Outcome::from_status(placement.status);
            if outcome.is_terminal() {
                return self.finish(mover, outcome, relayed).await;
            }

            let idle = self.seat_mut(mover.other());
            let forwarded = async {
                protocol::write_code(&mut idle.writer, Outcome::Continue.code()).await?;
                protocol::write_move(&mut idle.writer, relayed).await
            };
            if forwarded.await.is_err() {
                return self.abort(AbortReason::Disconnected(mover.other())).await;
            }

            mover = mover.other();
        }
    }

    fn seat_mut(&mut self, role: Role) -> &mut Seat<S> {
        match role {
            Role::FirstMover => &mut self.first,
            Role::SecondMover => &mut self.second,
        }
    }

    /// Waits for the mover's move while watching the idle peer.
    async fn await_move(&mut self, mover: Role) -> Result<WireMove, AbortReason> {
        let Self {
            first,
            second,
            turn_timeout,
            shutdown,
            ..
        } = self;
        let (active, idle) = match mover {
            Role::FirstMover => (first, second),
            Role::SecondMover => (second, first),
        };
        let idle_role = idle.role;

        let exchange = async {
            tokio::select! {
                result = protocol::read_move(&mut active.reader) => {
                    result.map_err(|err| {
                        debug!(error = %err, "Mover read failed");
                        AbortReason::Disconnected(mover)
                    })
                }
                result = idle.reader.fill_buf() => match result {
                    Ok(buf) if buf.is_empty() => Err(AbortReason::Disconnected(idle_role)),
                    Ok(_) => Err(AbortReason::OutOfTurn(idle_role)),
                    Err(_) => Err(AbortReason::Disconnected(idle_role)),
                },
                _ = shutdown_requested(shutdown.as_mut()) => Err(AbortReason::Shutdown),
            }
        };

        match *turn_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or(Err(AbortReason::TurnTimeout(mover))),
            None => exchange.await,
        }
    }

    /// Announces a win or draw and forwards the final move to the other peer.
    async fn finish(mut self, mover: Role, outcome: Outcome, relayed: WireMove) -> SessionReport {
        self.phase = SessionPhase::Terminated;

        let code = outcome.code();
        if let Err(err) = protocol::write_code(&mut self.seat_mut(mover).writer, code).await {
            warn!(error = %err, %mover, "Failed to send outcome to mover");
        }
        let idle = self.seat_mut(mover.other());
        let announced = async {
            protocol::write_code(&mut idle.writer, code).await?;
            protocol::write_move(&mut idle.writer, relayed).await
        };
        if let Err(err) = announced.await {
            warn!(error = %err, peer = %mover.other(), "Failed to send outcome to peer");
        }

        let end = match self.engine.status() {
            GameStatus::Won(_) => SessionEnd::Won(mover),
            _ => SessionEnd::Draw,
        };
        info!(%end, moves = self.engine.history().len(), "Session finished");
        SessionReport::new(self.id, end, self.engine.history().len())
    }

    /// Sends the aborted code to every reachable peer and terminates.
    async fn abort(mut self, reason: AbortReason) -> SessionReport {
        self.phase = SessionPhase::Terminated;
        warn!(%reason, "Session aborted");

        for role in [Role::FirstMover, Role::SecondMover] {
            if reason.lost_peer() == Some(role) {
                continue;
            }
            let seat = self.seat_mut(role);
            if let Err(err) = protocol::write_code(&mut seat.writer, Outcome::Aborted.code()).await {
                debug!(error = %err, %role, "Peer unreachable during abort");
            }
        }

        SessionReport::new(self.id, SessionEnd::Aborted(reason), self.engine.history().len())
    }
}

/// Resolves once shutdown is signalled; never resolves without a signal.
async fn shutdown_requested(shutdown: Option<&mut watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|&stop| stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
