//! The jumble transform: per-word random character permutation.
//!
//! Splits a message on whitespace and uniformly shuffles the characters of
//! every word longer than one character. The character multiset of each word
//! is preserved; only the order changes. Repeated whitespace collapses to a
//! single space on output.
//!
//! Randomness comes from the [`Environment`] so tests can seed it; under the
//! production environment outputs are non-deterministic and verified by
//! invariant (multiset preservation), not by exact value.

use crate::env::Environment;

/// Jumble a message, word by word.
///
/// Words are maximal runs of non-whitespace characters. Words of length 0 or
/// 1 pass through unchanged; longer words get a uniform Fisher-Yates shuffle
/// of their chars. Output words are rejoined with single spaces.
pub fn jumble<E: Environment>(text: &str, env: &E) -> String {
    let words: Vec<String> = text.split_whitespace().map(|word| jumble_word(word, env)).collect();
    words.join(" ")
}

/// Shuffle the characters of a single word.
fn jumble_word<E: Environment>(word: &str, env: &E) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    if chars.len() <= 1 {
        return word.to_owned();
    }

    // Fisher-Yates. The modulo over u64 is uniform to within 2^-64 for any
    // word a client can send.
    for i in (1..chars.len()).rev() {
        let j = (env.random_u64() % (i as u64 + 1)) as usize;
        chars.swap(i, j);
    }

    chars.into_iter().collect()
}
