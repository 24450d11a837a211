//! Error types for the connection core.
//!
//! Strongly-typed errors for the state machine seam. Inbound frame
//! handling is deliberately total (bad frames degrade, they do not
//! error); these errors cover caller mistakes and transport failures.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors that can occur during connection state machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred
        state: ConnectionState,
        /// Operation that was attempted
        operation: String,
    },

    /// Message composition attempted before the handshake completed
    #[error("cannot send: not authenticated (state {state:?})")]
    NotAuthenticated {
        /// Current state when the send was attempted
        state: ConnectionState,
    },

    /// Outbound message body is empty or whitespace-only
    #[error("cannot send an empty message")]
    EmptyMessage,

    /// Envelope encoding or wire-format violation
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Underlying transport error
    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    /// Returns true if the same operation may succeed on retry.
    ///
    /// Transport failures are transient; state machine misuse and
    /// protocol violations are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<impulse_proto::ProtocolError> for ConnectionError {
    fn from(err: impulse_proto::ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
