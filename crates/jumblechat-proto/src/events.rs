//! Inbound and outbound event payloads.
//!
//! Inbound frames decode to [`ClientEvent`]; outbound frames encode from
//! [`ServerEvent`]. The `disconnect` event has no wire payload - it is
//! inferred from the websocket closing.

use serde::{Deserialize, Serialize};

use crate::{RoomId, errors::Result};

/// Events a client may send, tagged by the `event` field.
///
/// Unknown event names and missing fields fail decoding with a
/// [`crate::ProtocolError`]; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Enter a room under a username.
    Join {
        /// Display name to register in the room.
        username: String,
        /// Room to enter (created implicitly on first member).
        room: RoomId,
    },

    /// Send a chat message to a room.
    Message {
        /// Sender display name, echoed verbatim in the broadcast.
        username: String,
        /// Room to broadcast into.
        room: RoomId,
        /// Message text.
        message: String,
    },

    /// Change a room's broadcast mode (admin panel).
    ///
    /// The mode is carried as a raw string: anything other than `"normal"`
    /// behaves as jumbled (see [`crate::RoomMode::from_wire`]), but the raw
    /// value is still echoed in the admin notice.
    AdminModeChange {
        /// Room whose mode changes ("channel" in admin-panel terms).
        channel: RoomId,
        /// Requested mode string.
        mode: String,
    },
}

impl ClientEvent {
    /// Decode a text frame into an event.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Events the server sends, tagged by the `event` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A chat payload: either a system notice string or a chat object.
    Message(MessageBody),

    /// A rejected inbound frame, reported back to the sender only.
    Error(String),
}

/// Body of an outbound `message` event.
///
/// System notices (joins, departures, admin changes, the presence listing)
/// are bare strings; user messages are objects carrying both the original
/// and the jumbled text so the client decides which to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    /// System notice.
    Notice(String),
    /// User chat message.
    Chat(ChatMessage),
}

/// A broadcast user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender display name as supplied in the inbound event.
    pub username: String,
    /// Untransformed message text.
    pub original: String,
    /// Jumbled text when the room is jumbled, otherwise identical to
    /// `original`.
    pub jumbled: String,
}

impl ServerEvent {
    /// A system notice message.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::Message(MessageBody::Notice(text.into()))
    }

    /// A user chat message.
    pub fn chat(username: impl Into<String>, original: impl Into<String>, jumbled: impl Into<String>) -> Self {
        Self::Message(MessageBody::Chat(ChatMessage {
            username: username.into(),
            original: original.into(),
            jumbled: jumbled.into(),
        }))
    }

    /// An error report for the offending connection.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Encode the event into a text frame.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
