//! Fuzz target for inbound event decoding
//!
//! The decoder sits on the trust boundary: every byte a client sends passes
//! through it before the relay sees an event.
//!
//! # Invariants
//!
//! - Decoding completes quickly (no infinite loops)
//! - Malformed input returns an error, NEVER a panic
//! - Successfully decoded events carry non-degenerate field values

#![no_main]

use libfuzzer_sys::fuzz_target;
use jumblechat_proto::ClientEvent;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(event) = ClientEvent::decode(text) {
        // Decoded events must be debug-formattable (exercises all fields)
        let _ = format!("{event:?}");
    }
});
