//! Wire protocol between the relay server and its clients.
//!
//! Every value is a big-endian signed 32-bit integer with no framing:
//!
//! - server → first mover: role `1`, then start signal `1` once paired
//! - server → second mover: role `2`
//! - mover → server: `row, column` (both zero-based)
//! - server → peers: an [`Outcome`] code; the non-mover also receives the
//!   mover's `row, column` unless the outcome is [`Outcome::Aborted`]

use crate::error::NetError;
use connect_four_engine::{GameStatus, Marker, Placement};
use derive_more::Display;
use derive_new::new;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{instrument, trace};

/// Signal sent to the first mover once the second mover has joined.
pub const START_SIGNAL: i32 = 1;

/// Turn-order role assigned at pairing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Role {
    /// Moves first, plays `X`.
    #[display("first mover")]
    FirstMover,
    /// Moves second, plays `O`.
    #[display("second mover")]
    SecondMover,
}

impl Role {
    /// Wire code of the role.
    pub fn code(self) -> i32 {
        match self {
            Role::FirstMover => 1,
            Role::SecondMover => 2,
        }
    }

    /// Parses a role code.
    pub fn from_code(code: i32) -> Result<Self, NetError> {
        match code {
            1 => Ok(Role::FirstMover),
            2 => Ok(Role::SecondMover),
            other => Err(NetError::unknown_code("role", other)),
        }
    }

    /// Marker played by this role.
    pub fn marker(self) -> Marker {
        match self {
            Role::FirstMover => Marker::X,
            Role::SecondMover => Marker::O,
        }
    }

    /// Role of the other peer.
    pub fn other(self) -> Self {
        match self {
            Role::FirstMover => Role::SecondMover,
            Role::SecondMover => Role::FirstMover,
        }
    }
}

/// Outcome code sent after every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Outcome {
    /// Game goes on; the receiver moves next.
    Continue,
    /// First mover completed a run.
    FirstMoverWin,
    /// Second mover completed a run.
    SecondMoverWin,
    /// Board filled without a run.
    Draw,
    /// Session ended without a result.
    Aborted,
}

impl Outcome {
    /// Wire code of the outcome.
    pub fn code(self) -> i32 {
        match self {
            Outcome::FirstMoverWin => 1,
            Outcome::SecondMoverWin => 2,
            Outcome::Draw => 3,
            Outcome::Continue => 4,
            Outcome::Aborted => 5,
        }
    }

    /// Parses an outcome code.
    pub fn from_code(code: i32) -> Result<Self, NetError> {
        match code {
            1 => Ok(Outcome::FirstMoverWin),
            2 => Ok(Outcome::SecondMoverWin),
            3 => Ok(Outcome::Draw),
            4 => Ok(Outcome::Continue),
            5 => Ok(Outcome::Aborted),
            other => Err(NetError::unknown_code("outcome", other)),
        }
    }

    /// Outcome describing an engine status.
    pub fn from_status(status: GameStatus) -> Self {
        match status {
            GameStatus::InProgress => Outcome::Continue,
            GameStatus::Won(Marker::X) => Outcome::FirstMoverWin,
            GameStatus::Won(Marker::O) => Outcome::SecondMoverWin,
            GameStatus::Draw => Outcome::Draw,
        }
    }

    /// Outcome announcing a win for `role`.
    pub fn win_for(role: Role) -> Self {
        match role {
            Role::FirstMover => Outcome::FirstMoverWin,
            Role::SecondMover => Outcome::SecondMoverWin,
        }
    }

    /// Checks whether the session is over after this outcome.
    pub fn is_terminal(self) -> bool {
        self != Outcome::Continue
    }
}

/// A move as it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new)]
pub struct WireMove {
    /// Landing row reported by the sender (0 is the top row).
    pub row: i32,
    /// Zero-based column.
    pub column: i32,
}

impl WireMove {
    /// Column as a board index. Negative columns map past the board edge.
    pub fn column_index(&self) -> usize {
        usize::try_from(self.column).unwrap_or(usize::MAX)
    }
}

impl From<Placement> for WireMove {
    fn from(placement: Placement) -> Self {
        Self::new(to_wire(placement.row), to_wire(placement.column))
    }
}

fn to_wire(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Reads one code.
#[instrument(level = "trace", skip(reader))]
pub async fn read_code<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, NetError> {
    let code = reader.read_i32().await?;
    trace!(code, "Read code");
    Ok(code)
}

/// Writes one code and flushes.
#[instrument(level = "trace", skip(writer))]
pub async fn write_code<W: AsyncWrite + Unpin>(writer: &mut W, code: i32) -> Result<(), NetError> {
    writer.write_i32(code).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads a `row, column` pair.
#[instrument(level = "trace", skip(reader))]
pub async fn read_move<R: AsyncRead + Unpin>(reader: &mut R) -> Result<WireMove, NetError> {
    let row = reader.read_i32().await?;
    let column = reader.read_i32().await?;
    trace!(row, column, "Read move");
    Ok(WireMove::new(row, column))
}

/// Writes a `row, column` pair and flushes.
#[instrument(level = "trace", skip(writer))]
pub async fn write_move<W: AsyncWrite + Unpin>(
    writer: &mut W,
    mov: WireMove,
) -> Result<(), NetError> {
    writer.write_i32(mov.row).await?;
    writer.write_i32(mov.column).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes() {
        assert_eq!(Role::FirstMover.code(), 1);
        assert_eq!(Role::from_code(2).unwrap(), Role::SecondMover);
        assert!(Role::from_code(0).is_err());
        assert_eq!(Role::SecondMover.marker(), Marker::O);
        assert_eq!(Role::FirstMover.other(), Role::SecondMover);
    }

    #[test]
    fn test_outcome_codes_match_legacy_values() {
        assert_eq!(Outcome::FirstMoverWin.code(), 1);
        assert_eq!(Outcome::SecondMoverWin.code(), 2);
        assert_eq!(Outcome::Draw.code(), 3);
        assert_eq!(Outcome::Continue.code(), 4);
        assert_eq!(Outcome::Aborted.code(), 5);
        assert!(matches!(
            Outcome::from_code(6),
            Err(NetError::UnknownCode { code: 6, .. })
        ));
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(GameStatus::InProgress), Outcome::Continue);
        assert_eq!(
            Outcome::from_status(GameStatus::Won(Marker::O)),
            Outcome::SecondMoverWin
        );
        assert!(Outcome::from_status(GameStatus::Draw).is_terminal());
    }

    #[test]
    fn test_negative_column_is_off_board() {
        assert_eq!(WireMove::new(0, -1).column_index(), usize::MAX);
        assert_eq!(WireMove::new(5, 3).column_index(), 3);
    }

    #[tokio::test]
    async fn test_codes_are_big_endian() {
        let mut buf = Vec::new();
        write_code(&mut buf, Outcome::Continue.code()).await.unwrap();
        write_move(&mut buf, WireMove::new(5, 2)).await.unwrap();
        assert_eq!(buf, [0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 2]);

        let mut reader = buf.as_slice();
        assert_eq!(read_code(&mut reader).await.unwrap(), 4);
        assert_eq!(read_move(&mut reader).await.unwrap(), WireMove::new(5, 2));
        assert!(read_code(&mut reader).await.unwrap_err().is_disconnect());
    }
}
