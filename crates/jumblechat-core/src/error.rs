//! Error types for core relay logic.

use thiserror::Error;

use crate::session::SessionState;

/// Errors from the session lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// An operation was attempted from a state that does not permit it.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// State the session was in when the operation was attempted.
        state: SessionState,
        /// Operation that was attempted.
        operation: &'static str,
    },
}
