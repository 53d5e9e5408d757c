//! Server error types.

use std::fmt;

use crate::server_error::RelayError;

/// Errors that can occur in the server runtime.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, etc.).
    ///
    /// Fatal; fix configuration and restart.
    Config(String),

    /// Transport/network error (bind failure, I/O error, etc.).
    ///
    /// May be transient (network issues) or fatal (bind address in use).
    Transport(String),

    /// Protocol error (malformed frame, failed websocket upgrade, etc.).
    ///
    /// Fatal for that connection; the server keeps serving other clients.
    Protocol(String),

    /// Internal error (unexpected state, logic bug).
    Internal(String),

    /// Driver error (from `RelayDriver` processing).
    Driver(RelayError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Driver(err) => write!(f, "driver error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RelayError> for ServerError {
    fn from(err: RelayError) -> Self {
        Self::Driver(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<jumblechat_proto::ProtocolError> for ServerError {
    fn from(err: jumblechat_proto::ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
