//! Comparison result types: the structured output of the compare engine and
//! the aggregate mutated in place by merges.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tm_core::{HighlightMask, Side, TokenSequence, TokenSpan};

use crate::mapping::SentenceMappings;

// ---------------------------------------------------------------------------
// DiffChunk
// ---------------------------------------------------------------------------

/// A retained `semantic_diff` pair with text snapshots of both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffChunk {
    pub left: TokenSpan,
    pub right: TokenSpan,
    /// Current token texts inside `left`.
    pub left_text: Vec<String>,
    /// Current token texts inside `right`.
    pub right_text: Vec<String>,
    /// Chunk similarity at alignment time.
    pub similarity: f64,
}

impl DiffChunk {
    pub fn span(&self, side: Side) -> TokenSpan {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn text(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.left_text,
            Side::Right => &self.right_text,
        }
    }
}

// ---------------------------------------------------------------------------
// ComparisonResult
// ---------------------------------------------------------------------------

/// Everything produced by one comparison.
///
/// Token sequences never change length after construction, so chunk spans and
/// sentence mappings stay valid across merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Stable unique identifier for this comparison run (UUIDv4).
    pub run_id: Uuid,
    /// Wall-clock duration of the comparison in milliseconds.
    pub elapsed_ms: u64,
    pub left_tokens: TokenSequence,
    pub right_tokens: TokenSequence,
    pub left_highlights: HighlightMask,
    pub right_highlights: HighlightMask,
    /// Differing chunk pairs still holding at least one highlight.
    pub chunks: Vec<DiffChunk>,
    pub left_sentences: Vec<String>,
    pub right_sentences: Vec<String>,
    pub left_sentence_highlights: HighlightMask,
    pub right_sentence_highlights: HighlightMask,
    pub sentence_mappings: SentenceMappings,
    /// Highlighted tokens on the right.
    pub additions: usize,
    /// Highlighted tokens on the left.
    pub removals: usize,
    /// `(max(|L|, |R|) - additions - removals) / max(|L|, |R|)`, 1 when both
    /// sides are empty. Not clamped; heavy divergence can push it below 0.
    pub similarity: f64,
}

impl ComparisonResult {
    pub fn tokens(&self, side: Side) -> &TokenSequence {
        match side {
            Side::Left => &self.left_tokens,
            Side::Right => &self.right_tokens,
        }
    }

    pub fn highlights(&self, side: Side) -> &HighlightMask {
        match side {
            Side::Left => &self.left_highlights,
            Side::Right => &self.right_highlights,
        }
    }

    pub fn highlights_mut(&mut self, side: Side) -> &mut HighlightMask {
        match side {
            Side::Left => &mut self.left_highlights,
            Side::Right => &mut self.right_highlights,
        }
    }

    /// Token sequence and highlight mask of one side, both mutable.
    pub fn side_mut(&mut self, side: Side) -> (&mut TokenSequence, &mut HighlightMask) {
        match side {
            Side::Left => (&mut self.left_tokens, &mut self.left_highlights),
            Side::Right => (&mut self.right_tokens, &mut self.right_highlights),
        }
    }

    pub fn sentences(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.left_sentences,
            Side::Right => &self.right_sentences,
        }
    }

    pub fn sentence_highlights(&self, side: Side) -> &HighlightMask {
        match side {
            Side::Left => &self.left_sentence_highlights,
            Side::Right => &self.right_sentence_highlights,
        }
    }

    pub fn sentence_highlights_mut(&mut self, side: Side) -> &mut HighlightMask {
        match side {
            Side::Left => &mut self.left_sentence_highlights,
            Side::Right => &mut self.right_sentence_highlights,
        }
    }

    /// Concatenated current tokens of `side`: the merged document.
    pub fn text(&self, side: Side) -> String {
        self.tokens(side).concat()
    }

    /// Index of the first retained chunk whose `side` span contains `index`.
    pub fn chunk_containing(&self, side: Side, index: usize) -> Option<usize> {
        self.chunks.iter().position(|c| c.span(side).contains(index))
    }

    /// Recount highlights and recompute the similarity score.
    pub fn refresh_stats(&mut self) {
        self.additions = self.right_highlights.count();
        self.removals = self.left_highlights.count();
        self.similarity = similarity_score(
            self.left_tokens.len(),
            self.right_tokens.len(),
            self.additions,
            self.removals,
        );
    }

    /// Assert the structural invariants. Compiled out of release builds.
    pub fn debug_check(&self) {
        debug_assert_eq!(self.left_highlights.len(), self.left_tokens.len());
        debug_assert_eq!(self.right_highlights.len(), self.right_tokens.len());
        debug_assert_eq!(self.left_sentence_highlights.len(), self.left_sentences.len());
        debug_assert_eq!(self.right_sentence_highlights.len(), self.right_sentences.len());
        for chunk in &self.chunks {
            debug_assert!(
                chunk.left.fits(self.left_tokens.len()),
                "chunk {chunk:?} out of left bounds"
            );
            debug_assert!(
                chunk.right.fits(self.right_tokens.len()),
                "chunk {chunk:?} out of right bounds"
            );
        }
        for side in [Side::Left, Side::Right] {
            let tokens = self.tokens(side);
            for indices in self.sentence_mappings.for_side(side) {
                debug_assert!(
                    indices.iter().all(|&i| tokens.get(i).is_some_and(|t| !t.is_whitespace())),
                    "{} sentence mapping {indices:?} leaves content tokens",
                    side.as_str()
                );
            }
        }
    }
}

/// `(max - additions - removals) / max` over the longer side; 1.0 when both
/// sides are empty.
pub fn similarity_score(
    left_len: usize,
    right_len: usize,
    additions: usize,
    removals: usize,
) -> f64 {
    let total = left_len.max(right_len);
    if total == 0 {
        return 1.0;
    }
    (total as f64 - additions as f64 - removals as f64) / total as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
