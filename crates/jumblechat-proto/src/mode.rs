//! Per-room broadcast modes.

use std::fmt;

/// Broadcast mode of a room.
///
/// Rooms default to [`RoomMode::Jumbled`]; the admin panel can flip a room to
/// `Normal` (messages pass through untouched) and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomMode {
    /// Messages broadcast unchanged.
    Normal,
    /// Message text is word-jumbled before broadcast.
    #[default]
    Jumbled,
}

impl RoomMode {
    /// Parse the wire representation of a mode.
    ///
    /// Only the exact string `"normal"` selects [`RoomMode::Normal`]; every
    /// other value behaves as jumbled. That fallback is the de-facto error
    /// policy for unrecognized mode strings - they are accepted, echoed back
    /// in the admin notice, and treated as jumbled.
    pub fn from_wire(mode: &str) -> Self {
        if mode == "normal" { Self::Normal } else { Self::Jumbled }
    }

    /// Canonical wire string for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Jumbled => "jumbled",
        }
    }
}

impl fmt::Display for RoomMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_requires_exact_match() {
        assert_eq!(RoomMode::from_wire("normal"), RoomMode::Normal);
        assert_eq!(RoomMode::from_wire("Normal"), RoomMode::Jumbled);
        assert_eq!(RoomMode::from_wire("NORMAL"), RoomMode::Jumbled);
    }

    #[test]
    fn unrecognized_modes_fall_back_to_jumbled() {
        assert_eq!(RoomMode::from_wire("jumbled"), RoomMode::Jumbled);
        assert_eq!(RoomMode::from_wire("loud"), RoomMode::Jumbled);
        assert_eq!(RoomMode::from_wire(""), RoomMode::Jumbled);
    }

    #[test]
    fn default_is_jumbled() {
        assert_eq!(RoomMode::default(), RoomMode::Jumbled);
    }
}
