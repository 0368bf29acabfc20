//! Chunk alignment.
//!
//! Two strategies are available:
//!
//! 1. **Positional** (default): the i-th left chunk is compared only with the
//!    i-th right chunk. A pair is `identical` when its chunk similarity is
//!    above the threshold and `semantic_diff` otherwise. Chunks left over on
//!    the longer side become `semantic_diff` against an empty span. One extra
//!    chunk early on shifts every later pairing; this cascade is expected
//!    output of the strategy.
//! 2. **ContentLcs**: an LCS over the two chunk lists with case-insensitive
//!    chunk-text equality. Whitespace-only chunks never anchor a match.
//!    Matched chunks separated only by whitespace form one `identical` pair.
//!    Each unmatched stretch is cut into phrases at phrase-opening words
//!    (`the`, `how`, ...) and the phrases are paired in order; surplus
//!    phrases on the longer side fold into the last pair.
//!
//! For the texts
//!
//! ```text
//! Modern technology continues to transform the way humans interact ...
//! Modern technology keeps changing how people interact ...
//! ```
//!
//! ContentLcs yields `Modern technology` (identical), then
//! `continues to transform` / `keeps changing` and `the way humans` /
//! `how people` (both `semantic_diff`).

use serde::{Deserialize, Serialize};

use tm_core::{HeuristicTables, HighlightMask, TokenSpan};

use crate::chunk::Chunk;
use crate::lcs::lcs_pairs;
use crate::similarity::word_similarity;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How the two chunk lists are paired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    #[default]
    Positional,
    ContentLcs,
}

/// Disposition of an aligned chunk pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKind {
    Identical,
    SemanticDiff,
}

/// One aligned pair. Either span may be empty for a pure insertion or
/// deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPair {
    pub left: TokenSpan,
    pub right: TokenSpan,
    pub kind: PairKind,
    pub similarity: f64,
}

impl ChunkPair {
    pub fn is_diff(&self) -> bool {
        self.kind == PairKind::SemanticDiff
    }
}

// ---------------------------------------------------------------------------
// ChunkAligner
// ---------------------------------------------------------------------------

/// Pairs chunk lists and scores chunk similarity.
pub struct ChunkAligner<'a> {
    tables: &'a HeuristicTables,
    /// Pairs scoring strictly above this are `identical`.
    identical_threshold: f64,
    /// Weight of the relative length difference subtracted from the score.
    length_penalty: f64,
}

impl<'a> ChunkAligner<'a> {
    pub fn new(tables: &'a HeuristicTables, identical_threshold: f64, length_penalty: f64) -> Self {
        Self {
            tables,
            identical_threshold,
            length_penalty,
        }
    }

    pub fn align(
        &self,
        strategy: AlignmentStrategy,
        left: &[Chunk],
        right: &[Chunk],
    ) -> Vec<ChunkPair> {
        match strategy {
            AlignmentStrategy::Positional => self.align_positional(left, right),
            AlignmentStrategy::ContentLcs => self.align_content(left, right),
        }
    }

    /// Lockstep pairing by index.
    pub fn align_positional(&self, left: &[Chunk], right: &[Chunk]) -> Vec<ChunkPair> {
        let mut pairs: Vec<ChunkPair> = left
            .iter()
            .zip(right)
            .map(|(l, r)| {
                let similarity = self.chunk_similarity(&l.text, &r.text);
                ChunkPair {
                    left: l.span,
                    right: r.span,
                    kind: self.kind_for(similarity),
                    similarity,
                }
            })
            .collect();

        let paired = pairs.len();
        pairs.extend(left[paired..].iter().map(|l| ChunkPair {
            left: l.span,
            right: TokenSpan::empty(),
            kind: PairKind::SemanticDiff,
            similarity: 0.0,
        }));
        pairs.extend(right[paired..].iter().map(|r| ChunkPair {
            left: TokenSpan::empty(),
            right: r.span,
            kind: PairKind::SemanticDiff,
            similarity: 0.0,
        }));
        pairs
    }

    /// LCS pairing on normalised chunk text; unmatched runs are grouped.
    pub fn align_content(&self, left: &[Chunk], right: &[Chunk]) -> Vec<ChunkPair> {
        let left_norm: Vec<String> = left.iter().map(Chunk::normalized).collect();
        let right_norm: Vec<String> = right.iter().map(Chunk::normalized).collect();
        let matches = lcs_pairs(left.len(), right.len(), |i, j| {
            !left[i].is_blank() && left_norm[i] == right_norm[j]
        });

        let mut pairs = Vec::new();
        let mut run: Option<(TokenSpan, TokenSpan)> = None;
        let (mut li, mut ri) = (0usize, 0usize);
        for (lm, rm) in matches {
            let left_gap = content_chunks(&left[li..lm]);
            let right_gap = content_chunks(&right[ri..rm]);
            if !left_gap.is_empty() || !right_gap.is_empty() {
                flush_identical(&mut run, &mut pairs);
                self.push_gap(&left_gap, &right_gap, &mut pairs);
            }
            run = Some(match run {
                Some((l, r)) => (l.cover(left[lm].span), r.cover(right[rm].span)),
                None => (left[lm].span, right[rm].span),
            });
            li = lm + 1;
            ri = rm + 1;
        }
        flush_identical(&mut run, &mut pairs);
        self.push_gap(&content_chunks(&left[li..]), &content_chunks(&right[ri..]), &mut pairs);
        pairs
    }

    /// Average per-position word similarity over the shorter chunk, minus
    /// the weighted relative length difference, floored at zero.
    pub fn chunk_similarity<S: AsRef<str>>(&self, left: &[S], right: &[S]) -> f64 {
        let shared = left.len().min(right.len());
        let longest = left.len().max(right.len());
        if longest == 0 {
            return 0.0;
        }

        let base = if shared == 0 {
            0.0
        } else {
            let total: f64 = left
                .iter()
                .zip(right)
                .map(|(a, b)| word_similarity(a.as_ref(), b.as_ref(), self.tables))
                .sum();
            total / shared as f64
        };
        let length_diff = (left.len() as f64 - right.len() as f64).abs() / longest as f64;
        (base - length_diff * self.length_penalty).max(0.0)
    }

    fn kind_for(&self, similarity: f64) -> PairKind {
        if similarity > self.identical_threshold {
            PairKind::Identical
        } else {
            PairKind::SemanticDiff
        }
    }

    /// Pair the phrases of one unmatched stretch. Both inputs hold content
    /// chunks only.
    fn push_gap(&self, left: &[&Chunk], right: &[&Chunk], out: &mut Vec<ChunkPair>) {
        if left.is_empty() && right.is_empty() {
            return;
        }
        let left_starts = self.phrase_starts(left);
        let right_starts = self.phrase_starts(right);
        let count = left_starts.len().min(right_starts.len()).max(1);

        for k in 0..count {
            let l = phrase(left, &left_starts, k, count);
            let r = phrase(right, &right_starts, k, count);
            let left_words: Vec<&str> = l.iter().flat_map(|c| c.words()).collect();
            let right_words: Vec<&str> = r.iter().flat_map(|c| c.words()).collect();
            out.push(ChunkPair {
                left: cover(l),
                right: cover(r),
                kind: PairKind::SemanticDiff,
                similarity: self.chunk_similarity(&left_words, &right_words),
            });
        }
    }

    /// Offsets of the chunks that begin a phrase. The first chunk always does.
    fn phrase_starts(&self, chunks: &[&Chunk]) -> Vec<usize> {
        let categories = &self.tables.categories;
        chunks
            .iter()
            .enumerate()
            .filter(|(i, chunk)| {
                *i == 0
                    || chunk
                        .words()
                        .next()
                        .is_some_and(|w| categories.is_phrase_opener(&w.to_lowercase()))
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Mark every token of every `semantic_diff` pair on both sides.
pub fn highlight_pairs(
    pairs: &[ChunkPair],
    left_len: usize,
    right_len: usize,
) -> (HighlightMask, HighlightMask) {
    let mut left = HighlightMask::new(left_len);
    let mut right = HighlightMask::new(right_len);
    for pair in pairs.iter().filter(|p| p.is_diff()) {
        debug_assert!(pair.left.fits(left_len), "left span {:?} out of bounds", pair.left);
        debug_assert!(pair.right.fits(right_len), "right span {:?} out of bounds", pair.right);
        left.mark(pair.left);
        right.mark(pair.right);
    }
    (left, right)
}

fn cover(chunks: &[&Chunk]) -> TokenSpan {
    chunks
        .iter()
        .map(|c| c.span)
        .fold(TokenSpan::empty(), TokenSpan::cover)
}

fn content_chunks(chunks: &[Chunk]) -> Vec<&Chunk> {
    chunks.iter().filter(|c| !c.is_blank()).collect()
}

/// Phrase `k` of `count`. The last phrase runs to the end of `chunks`.
fn phrase<'s, 'c>(
    chunks: &'s [&'c Chunk],
    starts: &[usize],
    k: usize,
    count: usize,
) -> &'s [&'c Chunk] {
    match starts.get(k) {
        Some(&start) => {
            let end = if k + 1 == count {
                chunks.len()
            } else {
                starts.get(k + 1).copied().unwrap_or(chunks.len())
            };
            &chunks[start..end]
        }
        None => &[],
    }
}

fn flush_identical(run: &mut Option<(TokenSpan, TokenSpan)>, out: &mut Vec<ChunkPair>) {
    if let Some((left, right)) = run.take() {
        out.push(ChunkPair {
            left,
            right,
            kind: PairKind::Identical,
            similarity: 1.0,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
