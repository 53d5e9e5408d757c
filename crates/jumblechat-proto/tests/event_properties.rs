//! Property-based tests for event decoding.
//!
//! The decoder sits on the trust boundary: arbitrary bytes from any client
//! pass through it before touching relay state, so it must return a typed
//! error (never panic) for every input.

use jumblechat_proto::{ClientEvent, MessageBody, ServerEvent};
use proptest::prelude::*;

proptest! {
    /// Arbitrary text never panics the decoder.
    #[test]
    fn decode_is_total(input in ".*") {
        let _ = ClientEvent::decode(&input);
    }

    /// Valid join frames decode for any username and room strings.
    #[test]
    fn join_decodes_for_arbitrary_fields(username in ".*", room in ".*") {
        let frame = serde_json::json!({
            "event": "join",
            "data": { "username": username, "room": room },
        });
        let event = ClientEvent::decode(&frame.to_string()).unwrap();
        prop_assert!(matches!(event, ClientEvent::Join { .. }), "expected Join variant");
    }

    /// Chat broadcasts survive an encode/decode cycle intact.
    #[test]
    fn chat_round_trips(username in ".*", original in ".*", jumbled in ".*") {
        let event = ServerEvent::chat(&username, &original, &jumbled);
        let decoded: ServerEvent = serde_json::from_str(&event.encode().unwrap()).unwrap();
        match decoded {
            ServerEvent::Message(MessageBody::Chat(chat)) => {
                prop_assert_eq!(chat.username, username);
                prop_assert_eq!(chat.original, original);
                prop_assert_eq!(chat.jumbled, jumbled);
            }
            other => prop_assert!(false, "unexpected decode: {other:?}"),
        }
    }
}
