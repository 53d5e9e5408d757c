//! Session registry and room roster.
//!
//! The registry maintains three mappings: session → (room, username) for
//! disconnect cleanup, room → session IDs for broadcast fan-out, and room →
//! username roster for the presence listing shown to joiners. Rooms exist
//! implicitly from their first member and their roster entry disappears with
//! their last.
//!
//! Usernames are a set per room: two live sessions sharing a username in the
//! same room collapse into one roster entry, and the first of them to leave
//! removes it. The roster is a `BTreeSet` so the presence listing is always
//! in sorted order.

use std::collections::{BTreeSet, HashMap, HashSet};

use jumblechat_proto::RoomId;

/// What the registry knows about one joined connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Room the session joined.
    pub room: RoomId,
    /// Username it joined under.
    pub username: String,
}

/// Registry of joined sessions and per-room rosters.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Session ID → registration.
    sessions: HashMap<u64, SessionInfo>,
    /// Room → subscribed session IDs (broadcast targets).
    room_sessions: HashMap<RoomId, HashSet<u64>>,
    /// Room → usernames currently present.
    rosters: HashMap<RoomId, BTreeSet<String>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session in a room.
    ///
    /// Subscribes the session to the room and inserts the username into the
    /// roster, creating both on first use. If the session was already
    /// registered, the previous registration is removed first (a silent
    /// leave) and returned, keeping the roster invariant under re-join.
    pub fn register(
        &mut self,
        session_id: u64,
        room: RoomId,
        username: String,
    ) -> Option<SessionInfo> {
        let displaced = self.remove_registration(session_id);

        self.room_sessions.entry(room.clone()).or_default().insert(session_id);
        self.rosters.entry(room.clone()).or_default().insert(username.clone());
        self.sessions.insert(session_id, SessionInfo { room, username });

        displaced
    }

    /// Unregister a session.
    ///
    /// Idempotent: returns `None` when the session was never registered.
    /// Otherwise removes it from the room's broadcast set and roster
    /// (dropping empty entries) and returns the registration so the caller
    /// can announce the departure.
    pub fn unregister(&mut self, session_id: u64) -> Option<SessionInfo> {
        self.remove_registration(session_id)
    }

    /// Registration for a session. `None` if it never joined.
    pub fn session(&self, session_id: u64) -> Option<&SessionInfo> {
        self.sessions.get(&session_id)
    }

    /// Check if a session is registered.
    pub fn has_session(&self, session_id: u64) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// All sessions subscribed to a room.
    pub fn sessions_in_room(&self, room: &RoomId) -> impl Iterator<Item = u64> + '_ {
        self.room_sessions.get(room).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Usernames present in a room, in sorted order.
    pub fn members(&self, room: &RoomId) -> impl Iterator<Item = &str> + '_ {
        self.rosters.get(room).into_iter().flatten().map(String::as_str)
    }

    /// Number of distinct usernames in a room.
    pub fn member_count(&self, room: &RoomId) -> usize {
        self.rosters.get(room).map_or(0, BTreeSet::len)
    }

    /// Total number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rosters.len()
    }

    fn remove_registration(&mut self, session_id: u64) -> Option<SessionInfo> {
        let info = self.sessions.remove(&session_id)?;

        if let Some(subscribers) = self.room_sessions.get_mut(&info.room) {
            subscribers.remove(&session_id);
            if subscribers.is_empty() {
                self.room_sessions.remove(&info.room);
            }
        }

        if let Some(roster) = self.rosters.get_mut(&info.room) {
            roster.remove(&info.username);
            if roster.is_empty() {
                self.rosters.remove(&info.room);
            }
        }

        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::from(id)
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());

        assert!(registry.has_session(1));
        assert!(!registry.has_session(2));

        let info = registry.session(1).unwrap();
        assert_eq!(info.room, room("1"));
        assert_eq!(info.username, "alice");
    }

    #[test]
    fn unregister_returns_registration() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());
        let info = registry.unregister(1).unwrap();

        assert_eq!(info.room, room("1"));
        assert_eq!(info.username, "alice");
        assert!(!registry.has_session(1));
    }

    #[test]
    fn unregister_unknown_session_is_noop() {
        let mut registry = SessionRegistry::new();
        assert!(registry.unregister(999).is_none());
    }

    #[test]
    fn roster_lists_members_sorted() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "carol".to_owned());
        registry.register(2, room("1"), "alice".to_owned());
        registry.register(3, room("1"), "bob".to_owned());

        let members: Vec<&str> = registry.members(&room("1")).collect();
        assert_eq!(members, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn room_roster_removed_when_last_member_leaves() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());
        registry.register(2, room("1"), "bob".to_owned());
        assert_eq!(registry.room_count(), 1);

        registry.unregister(1);
        assert_eq!(registry.member_count(&room("1")), 1);

        registry.unregister(2);
        assert_eq!(registry.room_count(), 0);
        assert_eq!(registry.members(&room("1")).count(), 0);
    }

    #[test]
    fn duplicate_usernames_collapse_to_one_entry() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());
        registry.register(2, room("1"), "alice".to_owned());

        assert_eq!(registry.member_count(&room("1")), 1);

        // First leave removes the shared roster entry even though a second
        // session still maps to (room "1", "alice") - the known precision
        // loss of the roster model.
        registry.unregister(1);
        assert_eq!(registry.member_count(&room("1")), 0);
        assert!(registry.has_session(2));
    }

    #[test]
    fn rejoin_displaces_previous_registration() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());
        let displaced = registry.register(1, room("2"), "alice".to_owned()).unwrap();

        assert_eq!(displaced.room, room("1"));
        assert_eq!(registry.members(&room("1")).count(), 0);
        assert_eq!(registry.member_count(&room("2")), 1);

        let sessions: Vec<u64> = registry.sessions_in_room(&room("2")).collect();
        assert_eq!(sessions, vec![1]);
        assert_eq!(registry.sessions_in_room(&room("1")).count(), 0);
    }

    #[test]
    fn sessions_in_room_tracks_all_connections() {
        let mut registry = SessionRegistry::new();

        registry.register(1, room("1"), "alice".to_owned());
        registry.register(2, room("1"), "bob".to_owned());
        registry.register(3, room("2"), "carol".to_owned());

        let mut sessions: Vec<u64> = registry.sessions_in_room(&room("1")).collect();
        sessions.sort_unstable();
        assert_eq!(sessions, vec![1, 2]);
    }

    #[test]
    fn session_count() {
        let mut registry = SessionRegistry::new();

        assert_eq!(registry.session_count(), 0);
        registry.register(1, room("1"), "alice".to_owned());
        registry.register(2, room("2"), "bob".to_owned());
        assert_eq!(registry.session_count(), 2);

        registry.unregister(1);
        assert_eq!(registry.session_count(), 1);
    }
}
