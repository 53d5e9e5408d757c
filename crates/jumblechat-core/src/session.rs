//! Per-connection session lifecycle.
//!
//! Every websocket connection moves through a small state machine:
//!
//! ```text
//! ┌──────────┐   join    ┌────────┐   disconnect   ┌────────┐
//! │ Unjoined │──────────>│ Joined │───────────────>│ Closed │
//! └──────────┘           └────────┘                └────────┘
//!       │                     │
//!       │ disconnect          │ join (re-join, stays Joined)
//!       └─────────> Closed <──┘
//! ```
//!
//! The machine is pure - no I/O, no time. The driver owns one per live
//! connection and consults it when dispatching events.

use crate::error::SessionError;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no join event yet.
    Unjoined,
    /// Joined a room.
    Joined,
    /// Disconnected (terminal).
    Closed,
}

/// Session lifecycle state machine for one connection.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Create a session in [`SessionState::Unjoined`].
    pub fn new() -> Self {
        Self { state: SessionState::Unjoined }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session has joined a room.
    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.state == SessionState::Joined
    }

    /// Record a join.
    ///
    /// Valid from `Unjoined` and from `Joined` (a re-join replaces the
    /// previous registration at the registry level).
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] when the session is already closed.
    pub fn join(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::InvalidState { state: self.state, operation: "join" });
        }

        self.state = SessionState::Joined;
        Ok(())
    }

    /// Record the disconnect. Terminal; valid from any state.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
