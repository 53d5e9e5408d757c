//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` is the production implementation of the Environment trait:
//! real monotonic time, Tokio async sleep, and OS cryptographic randomness
//! via getrandom. Production behavior is therefore non-deterministic - the
//! jumble transform and session IDs draw from real entropy - while tests
//! substitute seeded environments.
//!
//! # Panics
//!
//! Panics if the OS RNG fails. This is intentional: session IDs come from
//! this RNG, and a relay that cannot draw entropy cannot hand out
//! unpredictable IDs. RNG failure indicates OS-level problems and is
//! extremely rare.

use std::time::Duration;

use jumblechat_core::env::Environment;

/// Production environment using system time and cryptographic RNG.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable for session ID generation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_random_u64_fills_all_bytes_eventually() {
        let env = SystemEnv::new();

        // Any single draw can be zero; eight draws of all-zero would mean a
        // broken RNG.
        let all_zero = (0..8).all(|_| env.random_u64() == 0);
        assert!(!all_zero, "RNG should produce non-zero values");
    }

    #[tokio::test]
    async fn system_env_sleep_works() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_millis(50)).await;
        let elapsed = env.now() - start;

        assert!(elapsed >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}
