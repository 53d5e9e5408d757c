//! Fuzz target for the jumble transform
//!
//! # Invariants
//!
//! - Never panics, for any input text (including multibyte and control
//!   characters)
//! - Word count is preserved
//! - Each output word is a character permutation of its input word

#![no_main]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use jumblechat_core::{env::Environment, jumble::jumble};
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

fn char_counts(word: &str) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for c in word.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let env = FuzzEnv(Arc::new(AtomicU64::new(0)));
    let output = jumble(text, &env);

    let input_words: Vec<&str> = text.split_whitespace().collect();
    let output_words: Vec<&str> = output.split_whitespace().collect();

    assert_eq!(input_words.len(), output_words.len());
    for (input, output) in input_words.iter().zip(&output_words) {
        assert_eq!(char_counts(input), char_counts(output));
    }
});
