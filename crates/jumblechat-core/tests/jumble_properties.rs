//! Property-based tests for the jumble transform.
//!
//! The transform is non-deterministic by design, so these properties check
//! invariants rather than exact output: per-word character multisets are
//! preserved, word structure is preserved, and short words are untouched.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use jumblechat_core::{env::Environment, jumble::jumble};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic environment backed by a seeded ChaCha8 stream.
#[derive(Clone)]
struct SeededEnv(Arc<Mutex<ChaCha8Rng>>);

impl SeededEnv {
    fn new(seed: u64) -> Self {
        Self(Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))))
    }
}

impl Environment for SeededEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.0.lock().unwrap().fill_bytes(buffer);
    }
}

fn char_counts(word: &str) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for c in word.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

proptest! {
    /// Every output word is a permutation of the corresponding input word.
    #[test]
    fn output_words_are_permutations(text in ".*", seed in any::<u64>()) {
        let env = SeededEnv::new(seed);
        let output = jumble(&text, &env);

        let in_words: Vec<&str> = text.split_whitespace().collect();
        let out_words: Vec<&str> = output.split_whitespace().collect();

        prop_assert_eq!(in_words.len(), out_words.len());
        for (input, output) in in_words.iter().zip(&out_words) {
            prop_assert_eq!(char_counts(input), char_counts(output));
        }
    }

    /// Words of length <= 1 are returned unchanged.
    #[test]
    fn single_char_words_unchanged(words in prop::collection::vec("[a-z]", 0..8), seed in any::<u64>()) {
        let env = SeededEnv::new(seed);
        let text = words.join(" ");
        prop_assert_eq!(jumble(&text, &env), text);
    }

    /// Output never contains repeated delimiters, regardless of input
    /// whitespace structure.
    #[test]
    fn output_is_single_spaced(text in "[ \t\na-z]*", seed in any::<u64>()) {
        let env = SeededEnv::new(seed);
        let output = jumble(&text, &env);
        prop_assert!(!output.contains("  "));
        prop_assert!(!output.starts_with(' '));
        prop_assert!(!output.ends_with(' '));
    }
}
