//! Relay driver error types.

use std::fmt;

/// Errors that can occur during relay driver processing.
#[derive(Debug)]
pub enum RelayError {
    /// Connection not found in the driver.
    ///
    /// An event arrived for a connection the driver never accepted, or one
    /// that already closed. The transport guarantees accept-before-event for
    /// live connections, so this mostly signals a race with disconnect;
    /// safe to drop the event.
    SessionNotFound(u64),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "session not found: {id}"),
        }
    }
}

impl std::error::Error for RelayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_display() {
        let err = RelayError::SessionNotFound(42);
        assert_eq!(err.to_string(), "session not found: 42");
    }
}
