//! Relay driver.
//!
//! Ties together the per-connection session lifecycle, the
//! [`SessionRegistry`] (session/room/roster mappings), and the [`ModeTable`].
//! Follows the action pattern: the runtime feeds events in, the driver
//! mutates state and returns actions for the runtime to execute. The driver
//! itself performs no I/O, which is what lets the tests below and in
//! `tests/` run it against a seeded environment with no sockets anywhere.

use std::collections::HashMap;

use jumblechat_core::{env::Environment, jumble::jumble, session::Session};
use jumblechat_proto::{ClientEvent, RoomId, RoomMode, ServerEvent};

use crate::{mode_table::ModeTable, registry::SessionRegistry, server_error::RelayError};

/// Username reserved for the admin panel.
pub const ADMIN_USERNAME: &str = "admin";

/// Room reserved for the admin control channel.
///
/// A join of exactly (`ADMIN_USERNAME`, `ADMIN_ROOM`) is an admin-panel
/// login: it registers like any session but announces nothing, since the
/// panel has no chat window. A convention inherited from the source system,
/// not a security boundary - see DESIGN.md.
pub const ADMIN_ROOM: &str = "149";

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { max_connections: 10_000 }
    }
}

/// Events that the relay driver processes.
///
/// Produced by the external runtime (production transport or tests).
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// A new websocket connection was accepted.
    ConnectionAccepted {
        /// Unique connection ID assigned by the runtime.
        session_id: u64,
    },

    /// A decoded event arrived from a connection.
    EventReceived {
        /// Connection that sent the event.
        session_id: u64,
        /// The decoded event.
        event: ClientEvent,
    },

    /// A connection was closed (by peer or error).
    ConnectionClosed {
        /// Connection that was closed.
        session_id: u64,
        /// Reason for closure.
        reason: String,
    },
}

/// Actions that the relay driver produces.
///
/// Executed by runtime-specific code (production or tests).
#[derive(Debug, Clone)]
pub enum RelayAction {
    /// Send an event to a specific session.
    SendToSession {
        /// Target session ID.
        session_id: u64,
        /// Event to send.
        event: ServerEvent,
    },

    /// Broadcast an event to all sessions in a room.
    BroadcastToRoom {
        /// Target room.
        room: RoomId,
        /// Event to broadcast.
        event: ServerEvent,
        /// Optional session to exclude from the broadcast.
        exclude_session: Option<u64>,
    },

    /// Close a connection.
    CloseConnection {
        /// Session to close.
        session_id: u64,
        /// Reason for closure.
        reason: String,
    },

    /// Log a message.
    Log {
        /// Log level.
        level: LogLevel,
        /// Message to log.
        message: String,
    },
}

/// Log levels for relay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational message.
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

/// Action-based relay driver.
///
/// Orchestrates connection lifecycle, room membership, and message
/// broadcast. All shared state lives here; the runtime serializes access
/// (one event at a time), so handlers never observe each other mid-mutation.
pub struct RelayDriver<E: Environment> {
    /// Connection lifecycle machines (session ID → state).
    connections: HashMap<u64, Session>,
    /// Session/room/roster registry.
    registry: SessionRegistry,
    /// Per-room broadcast modes.
    modes: ModeTable,
    /// Environment (time, RNG for the jumble shuffle).
    env: E,
    /// Relay configuration.
    config: RelayConfig,
}

impl<E: Environment> RelayDriver<E> {
    /// Create a new relay driver.
    pub fn new(env: E, config: RelayConfig) -> Self {
        Self {
            connections: HashMap::new(),
            registry: SessionRegistry::new(),
            modes: ModeTable::new(),
            env,
            config,
        }
    }

    /// Process a relay event and return actions to execute.
    ///
    /// This is the main entry point for the driver.
    pub fn process_event(&mut self, event: RelayEvent) -> Result<Vec<RelayAction>, RelayError> {
        match event {
            RelayEvent::ConnectionAccepted { session_id } => {
                self.handle_connection_accepted(session_id)
            },
            RelayEvent::EventReceived { session_id, event } => {
                self.handle_event_received(session_id, event)
            },
            RelayEvent::ConnectionClosed { session_id, reason } => {
                self.handle_connection_closed(session_id, &reason)
            },
        }
    }

    /// Handle a new connection being accepted.
    fn handle_connection_accepted(
        &mut self,
        session_id: u64,
    ) -> Result<Vec<RelayAction>, RelayError> {
        if self.connections.len() >= self.config.max_connections {
            return Ok(vec![RelayAction::CloseConnection {
                session_id,
                reason: "max connections exceeded".to_owned(),
            }]);
        }

        self.connections.insert(session_id, Session::new());

        Ok(vec![RelayAction::Log {
            level: LogLevel::Debug,
            message: format!("connection {session_id} accepted"),
        }])
    }

    /// Handle a decoded event from a connection.
    fn handle_event_received(
        &mut self,
        session_id: u64,
        event: ClientEvent,
    ) -> Result<Vec<RelayAction>, RelayError> {
        let conn = self
            .connections
            .get_mut(&session_id)
            .ok_or(RelayError::SessionNotFound(session_id))?;

        match event {
            ClientEvent::Join { username, room } => {
                if let Err(e) = conn.join() {
                    return Ok(vec![RelayAction::Log {
                        level: LogLevel::Warn,
                        message: format!("join rejected for connection {session_id}: {e}"),
                    }]);
                }
                Ok(self.handle_join(session_id, username, room))
            },
            ClientEvent::Message { username, room, message } => {
                Ok(self.handle_message(&username, room, message))
            },
            ClientEvent::AdminModeChange { channel, mode } => {
                Ok(self.handle_mode_change(channel, &mode))
            },
        }
    }

    /// Handle a join: register the session and announce it.
    fn handle_join(&mut self, session_id: u64, username: String, room: RoomId) -> Vec<RelayAction> {
        let mut actions = Vec::new();

        if let Some(previous) = self.registry.register(session_id, room.clone(), username.clone())
        {
            actions.push(RelayAction::Log {
                level: LogLevel::Debug,
                message: format!(
                    "connection {session_id} re-joined: left room {} as {}",
                    previous.room, previous.username
                ),
            });
        }

        // The admin panel logs in as a regular session but has no chat
        // window, so its join stays silent.
        let is_admin_panel = username == ADMIN_USERNAME && room.as_str() == ADMIN_ROOM;
        if !is_admin_panel {
            actions.push(RelayAction::BroadcastToRoom {
                room: room.clone(),
                event: ServerEvent::notice(format!("{username} has joined the chat.")),
                exclude_session: None,
            });

            let others: Vec<&str> =
                self.registry.members(&room).filter(|member| *member != username).collect();
            if !others.is_empty() {
                let listing = others.join(", ");
                actions.push(RelayAction::SendToSession {
                    session_id,
                    event: ServerEvent::notice(format!("Users already in the channel: {listing}")),
                });
            }
        }

        actions.push(RelayAction::Log {
            level: LogLevel::Info,
            message: format!("{username} joined room {room} (connection {session_id})"),
        });

        actions
    }

    /// Handle a chat message: apply the room mode and broadcast.
    fn handle_message(&self, username: &str, room: RoomId, message: String) -> Vec<RelayAction> {
        let mode = self.modes.mode(&room);
        let jumbled = match mode {
            RoomMode::Normal => message.clone(),
            RoomMode::Jumbled => jumble(&message, &self.env),
        };

        vec![
            RelayAction::Log {
                level: LogLevel::Debug,
                message: format!("chat message from {username} in room {room} ({mode})"),
            },
            RelayAction::BroadcastToRoom {
                room,
                event: ServerEvent::chat(username, message, jumbled),
                exclude_session: None,
            },
        ]
    }

    /// Handle an admin mode change: store the mode and notify the channel.
    ///
    /// Not tied to the sender's own room, and not authenticated - any
    /// connection may change any channel. See DESIGN.md.
    fn handle_mode_change(&mut self, channel: RoomId, mode: &str) -> Vec<RelayAction> {
        let parsed = RoomMode::from_wire(mode);
        self.modes.set_mode(channel.clone(), parsed);

        vec![
            RelayAction::Log {
                level: LogLevel::Info,
                message: format!("room {channel} mode set to {parsed} (wire value {mode:?})"),
            },
            RelayAction::BroadcastToRoom {
                room: channel.clone(),
                event: ServerEvent::notice(format!(
                    "Admin has changed channel {channel} mode to {mode}."
                )),
                exclude_session: None,
            },
        ]
    }

    /// Handle a connection being closed.
    ///
    /// Idempotent for never-joined connections: they disappear without a
    /// departure notice.
    fn handle_connection_closed(
        &mut self,
        session_id: u64,
        reason: &str,
    ) -> Result<Vec<RelayAction>, RelayError> {
        let mut actions = Vec::new();

        if let Some(mut conn) = self.connections.remove(&session_id) {
            conn.close();
        }

        if let Some(info) = self.registry.unregister(session_id) {
            actions.push(RelayAction::BroadcastToRoom {
                room: info.room.clone(),
                event: ServerEvent::notice(format!("{} has left the chat.", info.username)),
                exclude_session: None,
            });
            actions.push(RelayAction::Log {
                level: LogLevel::Info,
                message: format!(
                    "connection {session_id} closed: {reason}, {} left room {}",
                    info.username, info.room
                ),
            });
        } else {
            actions.push(RelayAction::Log {
                level: LogLevel::Debug,
                message: format!("connection {session_id} closed: {reason}"),
            });
        }

        Ok(actions)
    }

    /// All sessions subscribed to a room.
    pub fn sessions_in_room(&self, room: &RoomId) -> impl Iterator<Item = u64> + '_ {
        self.registry.sessions_in_room(room)
    }

    /// Usernames present in a room, in sorted order.
    pub fn members(&self, room: &RoomId) -> impl Iterator<Item = &str> + '_ {
        self.registry.members(room)
    }

    /// Broadcast mode for a room (default jumbled).
    pub fn mode(&self, room: &RoomId) -> RoomMode {
        self.modes.mode(room)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of joined sessions.
    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }
}

impl<E: Environment> std::fmt::Debug for RelayDriver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDriver")
            .field("connection_count", &self.connections.len())
            .field("session_count", &self.registry.session_count())
            .field("room_count", &self.registry.room_count())
            .finish()
    }
}
