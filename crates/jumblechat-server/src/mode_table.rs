//! Per-room broadcast mode table.
//!
//! Rooms without an entry are jumbled; an admin mode change writes an entry
//! unconditionally. Entries are never removed, even after a room empties -
//! the table grows by one entry per room ever configured. Observed behavior
//! of the source system, kept as-is.

use std::collections::HashMap;

use jumblechat_proto::{RoomId, RoomMode};

/// Table of explicitly-configured room modes.
#[derive(Debug, Default)]
pub struct ModeTable {
    modes: HashMap<RoomId, RoomMode>,
}

impl ModeTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcast mode for a room, defaulting to [`RoomMode::Jumbled`].
    pub fn mode(&self, room: &RoomId) -> RoomMode {
        self.modes.get(room).copied().unwrap_or_default()
    }

    /// Set a room's mode, overwriting any previous value.
    pub fn set_mode(&mut self, room: RoomId, mode: RoomMode) {
        self.modes.insert(room, mode);
    }

    /// Number of rooms with an explicit mode entry.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Whether any room has an explicit mode entry.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_rooms_default_to_jumbled() {
        let table = ModeTable::new();
        assert_eq!(table.mode(&RoomId::from("1")), RoomMode::Jumbled);
    }

    #[test]
    fn set_mode_overwrites() {
        let mut table = ModeTable::new();
        let room = RoomId::from("1");

        table.set_mode(room.clone(), RoomMode::Normal);
        assert_eq!(table.mode(&room), RoomMode::Normal);

        table.set_mode(room.clone(), RoomMode::Jumbled);
        assert_eq!(table.mode(&room), RoomMode::Jumbled);
    }

    #[test]
    fn entries_accumulate() {
        let mut table = ModeTable::new();

        table.set_mode(RoomId::from("1"), RoomMode::Normal);
        table.set_mode(RoomId::from("2"), RoomMode::Normal);
        table.set_mode(RoomId::from("1"), RoomMode::Jumbled);

        assert_eq!(table.len(), 2);
    }
}
