//! Error types for the network layer.

use connect_four_engine::PlaceError;
use derive_more::Display;
use tracing::instrument;

/// Failure while speaking the relay protocol.
#[derive(Debug, Display)]
pub enum NetError {
    /// Socket read or write failed.
    #[display("I/O error: {}", _0)]
    Io(std::io::Error),

    /// A code outside the protocol's vocabulary arrived.
    #[display("Unknown {} code {}", context, code)]
    UnknownCode {
        /// Which field was being read.
        context: &'static str,
        /// Raw value received.
        code: i32,
    },

    /// A peer named a column the authoritative board refuses.
    #[display("Illegal move: {}", _0)]
    IllegalMove(PlaceError),

    /// The server closed the connection before the game finished.
    #[display("Server closed the connection")]
    ServerClosed,

    /// The local move channel closed before a move was committed.
    #[display("Move input closed")]
    InputClosed,

    /// A relayed move does not fit the local board.
    #[display("Board out of sync: {}", _0)]
    Desync(String),
}

impl NetError {
    /// Creates an unknown-code error.
    #[instrument]
    pub fn unknown_code(context: &'static str, code: i32) -> Self {
        Self::UnknownCode { context, code }
    }

    /// Checks whether the error means the peer went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            NetError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            NetError::ServerClosed => true,
            _ => false,
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Io(err) => Some(err),
            NetError::IllegalMove(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        NetError::Io(err)
    }
}

impl From<PlaceError> for NetError {
    fn from(err: PlaceError) -> Self {
        NetError::IllegalMove(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_is_disconnect() {
        let err = NetError::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert!(err.is_disconnect());
        assert!(!NetError::unknown_code("outcome", 9).is_disconnect());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NetError::unknown_code("role", 7).to_string(),
            "Unknown role code 7"
        );
        assert_eq!(
            NetError::from(PlaceError::ColumnFull(0)).to_string(),
            "Illegal move: Column 1 is full"
        );
    }
}
