//! Word, set and holistic text similarity.
//!
//! [`word_similarity`] scores an exact case-insensitive match as 1.0, a pair
//! from the synonym table as 0.8, and anything else as one minus the
//! normalised Levenshtein distance. [`semantic_similarity`] asks an external
//! [`SimilarityOracle`] and falls back to [`text_jaccard`] when the oracle
//! fails or answers outside [0, 1].

use std::collections::HashSet;

use tracing::warn;

use tm_core::{HeuristicTables, Result};

use crate::tokenize::split_words;

/// Score given to two words listed as synonyms.
pub const SYNONYM_SCORE: f64 = 0.8;

// ---------------------------------------------------------------------------
// Word similarity
// ---------------------------------------------------------------------------

/// Similarity of two words in [0, 1].
pub fn word_similarity(a: &str, b: &str, tables: &HeuristicTables) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    if a_lower == b_lower {
        return 1.0;
    }
    if tables.are_synonyms(&a_lower, &b_lower) {
        return SYNONYM_SCORE;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = levenshtein(&a_lower, &b_lower);
    (1.0 - distance as f64 / max_len as f64).max(0.0)
}

/// Character-level edit distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

// ---------------------------------------------------------------------------
// Set similarity
// ---------------------------------------------------------------------------

/// `|A ∩ B| / |A ∪ B|`, or `empty_union` when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>, empty_union: f64) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return empty_union;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Lower-cased whitespace-split word set of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    split_words(text).into_iter().collect()
}

/// Jaccard similarity of the word sets of two texts; 1.0 when both are blank.
pub fn text_jaccard(a: &str, b: &str) -> f64 {
    jaccard(&word_set(a), &word_set(b), 1.0)
}

// ---------------------------------------------------------------------------
// Similarity oracle
// ---------------------------------------------------------------------------

/// External collaborator scoring the holistic semantic similarity of two
/// texts. Implementations may fail; callers never trust the answer blindly.
pub trait SimilarityOracle: Send + Sync {
    fn similarity(&self, left: &str, right: &str) -> Result<f64>;
}

impl<F> SimilarityOracle for F
where
    F: Fn(&str, &str) -> Result<f64> + Send + Sync,
{
    fn similarity(&self, left: &str, right: &str) -> Result<f64> {
        self(left, right)
    }
}

/// Ask `oracle` for a score, substituting [`text_jaccard`] when there is no
/// oracle, when it errors, or when its answer is not a number in [0, 1].
pub fn semantic_similarity(oracle: Option<&dyn SimilarityOracle>, left: &str, right: &str) -> f64 {
    let Some(oracle) = oracle else {
        return text_jaccard(left, right);
    };
    match oracle.similarity(left, right) {
        Ok(score) if (0.0..=1.0).contains(&score) => score,
        Ok(score) => {
            warn!(score, "similarity oracle answered out of range, using jaccard fallback");
            text_jaccard(left, right)
        }
        Err(e) => {
            warn!(error = %e, "similarity oracle failed, using jaccard fallback");
            text_jaccard(left, right)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
