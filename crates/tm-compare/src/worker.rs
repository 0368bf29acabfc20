//! Compare engine.
//!
//! [`CompareEngine`] is the primary entry point. It tokenizes both texts,
//! computes token highlights (chunk alignment by default, plain word LCS on
//! request), runs the sentence diff and sentence mapping, and assembles a
//! [`ComparisonResult`]. Each comparison is single-threaded;
//! [`CompareEngine::compare_batch`] fans independent comparisons out over
//! rayon.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use tm_core::{HeuristicTables, HighlightMask, Result, TmError, TokenSequence};

use crate::align::{highlight_pairs, AlignmentStrategy, ChunkAligner};
use crate::chunk::ChunkClassifier;
use crate::lcs::word_lcs;
use crate::mapping::{map_sentences, SentenceMappings};
use crate::result::{ComparisonResult, DiffChunk};
use crate::sentence::{sentence_lcs, SENTENCE_MATCH_THRESHOLD};
use crate::tokenize::{tokenize_sentences, tokenize_structural};

// ---------------------------------------------------------------------------
// CompareConfig
// ---------------------------------------------------------------------------

/// Which engine produces the surfaced token highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// Chunk segmentation and alignment; differing pairs are kept as chunks.
    #[default]
    Chunks,
    /// Exact word LCS; no chunks are retained.
    WordLcs,
}

/// Runtime configuration for the compare engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Chunk pairs scoring strictly above this are identical. Default: 0.7.
    pub identical_threshold: f64,
    /// Weight of the relative length difference in chunk similarity.
    /// Default: 0.2.
    pub length_penalty: f64,
    /// Sentences whose word-set Jaccard is strictly above this match.
    /// Default: 0.3.
    pub sentence_match_threshold: f64,
    pub alignment: AlignmentStrategy,
    pub highlight_mode: HighlightMode,
    pub tables: HeuristicTables,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            identical_threshold: 0.7,
            length_penalty: 0.2,
            sentence_match_threshold: SENTENCE_MATCH_THRESHOLD,
            alignment: AlignmentStrategy::default(),
            highlight_mode: HighlightMode::default(),
            tables: HeuristicTables::default(),
        }
    }
}

impl CompareConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| TmError::Config(format!("<string>: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TmError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("identical_threshold", self.identical_threshold),
            ("sentence_match_threshold", self.sentence_match_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TmError::Config(format!(
                    "{field} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if !(self.length_penalty >= 0.0) {
            return Err(TmError::Config(format!(
                "length_penalty must be non-negative, got {}",
                self.length_penalty
            )));
        }
        self.tables.validate()
    }
}

// ---------------------------------------------------------------------------
// CompareEngine
// ---------------------------------------------------------------------------

/// Deterministic compare engine. Holds no state between comparisons.
#[derive(Debug, Clone)]
pub struct CompareEngine {
    config: CompareConfig,
}

impl CompareEngine {
    /// Create a new engine with the given configuration.
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two texts and produce a [`ComparisonResult`].
    ///
    /// # Steps
    /// 1. Tokenize both sides structurally and into sentences.
    /// 2. Compute token highlights and the retained chunk list.
    /// 3. Run the sentence diff.
    /// 4. Map sentences to content-token indices on each side.
    /// 5. Compute additions, removals and similarity.
    pub fn compare(&self, left: &str, right: &str) -> ComparisonResult {
        let start = Instant::now();

        let left_tokens = tokenize_structural(left);
        let right_tokens = tokenize_structural(right);
        let left_sentences = tokenize_sentences(left);
        let right_sentences = tokenize_sentences(right);

        let (left_highlights, right_highlights, chunks) = match self.config.highlight_mode {
            HighlightMode::Chunks => self.chunk_diff(&left_tokens, &right_tokens),
            HighlightMode::WordLcs => {
                let (l, r) = word_lcs(&left_tokens, &right_tokens);
                (l, r, Vec::new())
            }
        };

        let (left_sentence_highlights, right_sentence_highlights) = sentence_lcs(
            &left_sentences,
            &right_sentences,
            self.config.sentence_match_threshold,
        );

        let sentence_mappings = SentenceMappings {
            left: map_sentences(&left_sentences, &left_tokens),
            right: map_sentences(&right_sentences, &right_tokens),
        };

        let mut result = ComparisonResult {
            run_id: Uuid::new_v4(),
            elapsed_ms: 0,
            left_tokens,
            right_tokens,
            left_highlights,
            right_highlights,
            chunks,
            left_sentences,
            right_sentences,
            left_sentence_highlights,
            right_sentence_highlights,
            sentence_mappings,
            additions: 0,
            removals: 0,
            similarity: 1.0,
        };
        result.refresh_stats();
        result.elapsed_ms = start.elapsed().as_millis() as u64;
        result.debug_check();

        debug!(
            run_id = %result.run_id,
            left_tokens = result.left_tokens.len(),
            right_tokens = result.right_tokens.len(),
            chunks = result.chunks.len(),
            additions = result.additions,
            removals = result.removals,
            elapsed_ms = result.elapsed_ms,
            "comparison complete"
        );
        result
    }

    /// Compare many independent pairs in parallel. Output order follows
    /// input order.
    pub fn compare_batch(&self, pairs: &[(String, String)]) -> Vec<ComparisonResult> {
        pairs
            .par_iter()
            .map(|(left, right)| self.compare(left, right))
            .collect()
    }

    /// Segment, align, and keep the differing pairs with text snapshots.
    fn chunk_diff(
        &self,
        left: &TokenSequence,
        right: &TokenSequence,
    ) -> (HighlightMask, HighlightMask, Vec<DiffChunk>) {
        let classifier = ChunkClassifier::new(&self.config.tables);
        let left_chunks = classifier.segment(left);
        let right_chunks = classifier.segment(right);

        let aligner = ChunkAligner::new(
            &self.config.tables,
            self.config.identical_threshold,
            self.config.length_penalty,
        );
        let pairs = aligner.align(self.config.alignment, &left_chunks, &right_chunks);
        let (left_highlights, right_highlights) = highlight_pairs(&pairs, left.len(), right.len());

        let chunks = pairs
            .into_iter()
            .filter(|p| p.is_diff())
            .map(|p| DiffChunk {
                left_text: left.span_texts(p.left),
                right_text: right.span_texts(p.right),
                left: p.left,
                right: p.right,
                similarity: p.similarity,
            })
            .collect();

        (left_highlights, right_highlights, chunks)
    }
}

impl Default for CompareEngine {
    fn default() -> Self {
        Self::new(CompareConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
