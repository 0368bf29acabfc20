//! Sentence → token index mapping.
//!
//! Each sentence is located in its side's content tokens (whitespace tokens
//! are skipped) as a contiguous, case-insensitive run of its words, searching
//! forward from the end of the previous sentence. When no such run exists
//! the next `N` unconsumed content tokens are taken instead, where `N` is the
//! sentence's word count. Left and right sides are mapped independently and
//! paired by sentence index.

use serde::{Deserialize, Serialize};

use tm_core::{Side, TokenSequence};

use crate::tokenize::split_words;

// ---------------------------------------------------------------------------
// SentenceMappings
// ---------------------------------------------------------------------------

/// Token indices covered by each sentence, per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceMappings {
    pub left: Vec<Vec<usize>>,
    pub right: Vec<Vec<usize>>,
}

impl SentenceMappings {
    pub fn for_side(&self, side: Side) -> &[Vec<usize>] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Indices of sentence `index` on `side`; empty when the side has fewer
    /// sentences.
    pub fn indices(&self, side: Side, index: usize) -> &[usize] {
        self.for_side(side)
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Map every sentence to the content-token indices it occupies in `tokens`.
pub fn map_sentences(sentences: &[String], tokens: &TokenSequence) -> Vec<Vec<usize>> {
    let content = tokens.content_indices();
    let content_words: Vec<String> = content
        .iter()
        .filter_map(|&i| tokens.get(i))
        .map(|t| t.normalized())
        .collect();

    let mut cursor = 0usize;
    let mut mappings = Vec::with_capacity(sentences.len());

    for sentence in sentences {
        let words = split_words(sentence);
        let found = find_run(&content_words, &words, cursor);

        let (start, len) = match found {
            Some(start) => (start, words.len()),
            None => (cursor, words.len().min(content.len().saturating_sub(cursor))),
        };
        let indices: Vec<usize> = content[start..start + len].to_vec();
        cursor = start + len;

        debug_assert!(
            indices.windows(2).all(|w| w[0] < w[1]),
            "sentence mapping {indices:?} is not strictly increasing"
        );
        mappings.push(indices);
    }

    mappings
}

/// First position at or after `from` where `needle` occurs contiguously in
/// `haystack`. An empty needle never matches.
fn find_run(haystack: &[String], needle: &[String], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&start| haystack[start..start + needle.len()] == *needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
