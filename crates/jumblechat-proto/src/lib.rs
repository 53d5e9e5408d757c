//! JumbleChat wire protocol.
//!
//! Events travel as JSON text frames over the websocket, one object per
//! frame, shaped `{"event": <name>, "data": <payload>}`. JSON was chosen over
//! a binary framing because it's self-describing (field names embedded),
//! trivially debuggable from a browser client, and the relay never needs to
//! route without deserializing - every frame is handled in full.
//!
//! # Invariants
//!
//! - Each inbound event name maps to exactly one [`ClientEvent`] variant
//!   (enforced by serde's tagged-enum representation).
//! - Decoding a malformed or incomplete frame yields a typed
//!   [`ProtocolError`], never a panic. Validation happens before any relay
//!   state is touched.

mod errors;
mod events;
mod mode;
mod room;

pub use errors::ProtocolError;
pub use events::{ChatMessage, ClientEvent, MessageBody, ServerEvent};
pub use mode::RoomMode;
pub use room::RoomId;
