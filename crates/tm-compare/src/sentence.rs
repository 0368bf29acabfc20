//! Sentence-level diff.
//!
//! Same DP and backtrack as the word diff, but two sentences "match" when
//! the Jaccard similarity of their lower-cased word sets is strictly above
//! a threshold (0.3 by default) instead of on string equality.

use std::collections::HashSet;

use tm_core::HighlightMask;

use crate::lcs::lcs_highlights;
use crate::similarity::{jaccard, word_set};

/// Default match threshold for [`sentence_lcs`].
pub const SENTENCE_MATCH_THRESHOLD: f64 = 0.3;

/// Highlight the sentences on each side that the similarity LCS leaves
/// unpaired.
pub fn sentence_lcs(
    left: &[String],
    right: &[String],
    threshold: f64,
) -> (HighlightMask, HighlightMask) {
    let left_sets: Vec<HashSet<String>> = left.iter().map(|s| word_set(s)).collect();
    let right_sets: Vec<HashSet<String>> = right.iter().map(|s| word_set(s)).collect();
    lcs_highlights(left.len(), right.len(), |i, j| {
        sentence_matches(&left_sets[i], &right_sets[j], threshold)
    })
}

/// Jaccard of two word sets is above `threshold`; an empty union scores 0.
pub fn sentence_matches(a: &HashSet<String>, b: &HashSet<String>, threshold: f64) -> bool {
    jaccard(a, b, 0.0) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize_sentences;

    fn sentences(text: &str) -> Vec<String> {
        tokenize_sentences(text)
    }

    #[test]
    fn reworded_sentence_still_matches() {
        let left = sentences("The cat sat on the mat.");
        let right = sentences("The cat sat on a rug.");
        let (l, r) = sentence_lcs(&left, &right, SENTENCE_MATCH_THRESHOLD);
        assert_eq!(l.count(), 0);
        assert_eq!(r.count(), 0);
    }

    #[test]
    fn unrelated_sentences_are_highlighted() {
        let left = sentences("Birds fly south. The cat sat on the mat.");
        let right = sentences("The cat sat on the mat. Fish swim deep.");
        let (l, r) = sentence_lcs(&left, &right, SENTENCE_MATCH_THRESHOLD);
        assert_eq!(l.as_slice(), &[true, false]);
        assert_eq!(r.as_slice(), &[false, true]);
    }

    #[test]
    fn threshold_is_strict() {
        // {a, b} vs {b, c}: 1/3 overlap.
        let a: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
        assert!(sentence_matches(&a, &b, 0.3));
        assert!(!sentence_matches(&a, &b, 1.0 / 3.0));
    }

    #[test]
    fn empty_lists() {
        let none: Vec<String> = Vec::new();
        let one = sentences("Only here.");
        let (l, r) = sentence_lcs(&none, &one, SENTENCE_MATCH_THRESHOLD);
        assert!(l.is_empty());
        assert_eq!(r.as_slice(), &[true]);
    }
}
