//! Protocol error types.
//!
//! A malformed frame is rejected with a typed error before it reaches the
//! relay; the transport turns the error into an outbound `error` event for
//! the offending connection and drops the frame.

use thiserror::Error;

/// Errors produced while decoding or encoding wire events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON, named an unknown event, or was missing
    /// required fields.
    #[error("malformed event: {0}")]
    Json(#[from] serde_json::Error),

    /// A non-text frame arrived where a JSON event was expected.
    #[error("expected a text frame")]
    NotText,
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_display_includes_cause() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = ProtocolError::from(err);
        assert!(err.to_string().starts_with("malformed event:"));
    }

    #[test]
    fn not_text_display() {
        assert_eq!(ProtocolError::NotText.to_string(), "expected a text frame");
    }
}
