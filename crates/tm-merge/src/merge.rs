//! Merge engine.
//!
//! A merge copies the opposite side's text over a highlighted unit of one
//! side. Token sequences are written through their existing slots and never
//! change length, so chunk spans and sentence mappings computed by the
//! compare engine stay valid for the lifetime of the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tm_compare::ComparisonResult;
use tm_core::{HighlightMask, Side};

use crate::selection::Selection;

/// Nearest-highlight scan radius for word selections.
pub const WORD_SEARCH_WINDOW: usize = 10;
/// Nearest-highlight scan radius for sentence selections.
pub const SENTENCE_SEARCH_WINDOW: usize = 5;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// The granularity a merge was applied at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeUnit {
    /// A single token taken from the nearest opposite highlight.
    Word,
    /// Every content token of a retained chunk.
    Chunk,
    Sentence,
}

/// Why a selection was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Index past the end of the current tokens or sentences.
    OutOfBounds,
    /// The unit is no longer highlighted, usually after an earlier merge.
    NotHighlighted,
    /// No highlighted counterpart exists on the opposite side.
    NoCounterpart,
    /// The selection resolves to nothing writable (whitespace only).
    NothingToReplace,
}

/// Result of one merge call. A skipped merge leaves the result untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeOutcome {
    Applied {
        side: Side,
        unit: MergeUnit,
        /// Token indices on `side` that were overwritten.
        replaced: Vec<usize>,
    },
    Skipped { reason: SkipReason },
}

impl MergeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MergeOutcome::Applied { .. })
    }
}

/// What a merge would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePreview {
    pub side: Side,
    pub unit: MergeUnit,
    /// Current text of the selected unit.
    pub selected_text: String,
    /// Text that would replace it.
    pub counterpart_text: String,
}

// ---------------------------------------------------------------------------
// MergePlan
// ---------------------------------------------------------------------------

/// Writes resolved against an unmodified result.
struct MergePlan {
    side: Side,
    unit: MergeUnit,
    selected_text: String,
    counterpart_text: String,
    /// `(index on side, replacement text)` in index order.
    writes: Vec<(usize, String)>,
    /// Whitespace indices on `side` whose highlight is cleared with the writes.
    clears: Vec<usize>,
    /// `(sentence on side, sentence on the opposite side)` to swap.
    sentence_swap: Option<(usize, usize)>,
}

// ---------------------------------------------------------------------------
// MergeEngine
// ---------------------------------------------------------------------------

/// Applies selections to a [`ComparisonResult`] in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeEngine {
    word_window: usize,
    sentence_window: usize,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self {
            word_window: WORD_SEARCH_WINDOW,
            sentence_window: SENTENCE_SEARCH_WINDOW,
        }
    }

    /// Override the nearest-highlight scan radii.
    pub fn with_windows(word_window: usize, sentence_window: usize) -> Self {
        Self {
            word_window,
            sentence_window,
        }
    }

    /// Merge `selection` into `result`.
    ///
    /// Algorithm:
    /// 1. Resolve the counterpart: the opposite span of the retained chunk
    ///    holding the selection, else the nearest highlighted opposite token
    ///    (sentence selections always use the nearest highlighted sentence).
    /// 2. Overwrite source tokens one-to-one up to the shorter unit, skipping
    ///    blank counterparts, and clear each replaced highlight along with
    ///    the whitespace between replaced chunk words. A chunk selection
    ///    outside the written stretch is skipped.
    /// 3. Drop chunks left with no highlight on either side and refresh the
    ///    text snapshots of the rest.
    /// 4. Recompute additions, removals and similarity.
    ///
    /// Stale or out-of-range selections return `Skipped` and change nothing.
    pub fn merge(&self, result: &mut ComparisonResult, selection: &Selection) -> MergeOutcome {
        let plan = match self.plan(result, selection) {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(run_id = %result.run_id, ?selection, ?reason, "merge skipped");
                return MergeOutcome::Skipped { reason };
            }
        };

        let replaced = apply(result, &plan);
        recompute_chunks(result);
        result.refresh_stats();
        result.debug_check();

        debug!(
            run_id = %result.run_id,
            side = plan.side.as_str(),
            unit = ?plan.unit,
            replaced = replaced.len(),
            chunks = result.chunks.len(),
            additions = result.additions,
            removals = result.removals,
            "merge applied"
        );

        MergeOutcome::Applied {
            side: plan.side,
            unit: plan.unit,
            replaced,
        }
    }

    /// Describe the merge `selection` would perform.
    pub fn preview(
        &self,
        result: &ComparisonResult,
        selection: &Selection,
    ) -> Result<MergePreview, SkipReason> {
        let plan = self.plan(result, selection)?;
        Ok(MergePreview {
            side: plan.side,
            unit: plan.unit,
            selected_text: plan.selected_text,
            counterpart_text: plan.counterpart_text,
        })
    }

    fn plan(
        &self,
        result: &ComparisonResult,
        selection: &Selection,
    ) -> Result<MergePlan, SkipReason> {
        match *selection {
            Selection::Word { side, index } => self.plan_word(result, side, index),
            Selection::Sentence { side, index } => self.plan_sentence(result, side, index),
        }
    }

    fn plan_word(
        &self,
        result: &ComparisonResult,
        side: Side,
        index: usize,
    ) -> Result<MergePlan, SkipReason> {
        let tokens = result.tokens(side);
        let Some(token) = tokens.get(index) else {
            return Err(SkipReason::OutOfBounds);
        };
        if !result.highlights(side).get(index) {
            return Err(SkipReason::NotHighlighted);
        }

        let opposite = side.opposite();
        let opp_tokens = result.tokens(opposite);

        if let Some(chunk) = result.chunk_containing(side, index).map(|i| &result.chunks[i]) {
            let opp_span = chunk.span(opposite);
            if !opp_span.is_empty() {
                let positions = tokens.content_indices_in(chunk.span(side));
                let words: Vec<String> = opp_tokens
                    .content_indices_in(opp_span)
                    .into_iter()
                    .filter_map(|i| opp_tokens.text_at(i).map(str::to_string))
                    .collect();

                let selected: Vec<&str> =
                    positions.iter().filter_map(|&i| tokens.text_at(i)).collect();
                let writes: Vec<(usize, String)> =
                    positions.iter().copied().zip(words.iter().cloned()).collect();

                // Only the written stretch of the chunk is resolved by this
                // merge; a selection past it has no counterpart word left.
                let (Some(&(first, _)), Some(&(last, _))) = (writes.first(), writes.last()) else {
                    return Err(SkipReason::NothingToReplace);
                };
                if index < first || index > last {
                    return Err(SkipReason::NothingToReplace);
                }
                let clears = (first..last)
                    .filter(|&i| tokens.get(i).is_some_and(|t| t.is_whitespace()))
                    .collect();

                return Ok(MergePlan {
                    side,
                    unit: MergeUnit::Chunk,
                    selected_text: selected.join(" "),
                    counterpart_text: words.join(" "),
                    writes,
                    clears,
                    sentence_swap: None,
                });
            }
        }

        if token.is_whitespace() {
            return Err(SkipReason::NothingToReplace);
        }
        let target = nearest_highlighted(result.highlights(opposite), index, self.word_window, |j| {
            opp_tokens.get(j).is_some_and(|t| !t.is_whitespace())
        })
        .ok_or(SkipReason::NoCounterpart)?;
        let counterpart = opp_tokens.text_at(target).ok_or(SkipReason::NoCounterpart)?;

        Ok(MergePlan {
            side,
            unit: MergeUnit::Word,
            selected_text: token.text.clone(),
            counterpart_text: counterpart.to_string(),
            writes: vec![(index, counterpart.to_string())],
            clears: Vec::new(),
            sentence_swap: None,
        })
    }

    fn plan_sentence(
        &self,
        result: &ComparisonResult,
        side: Side,
        index: usize,
    ) -> Result<MergePlan, SkipReason> {
        let Some(selected) = result.sentences(side).get(index) else {
            return Err(SkipReason::OutOfBounds);
        };
        if !result.sentence_highlights(side).get(index) {
            return Err(SkipReason::NotHighlighted);
        }

        let opposite = side.opposite();
        let target = nearest_highlighted(
            result.sentence_highlights(opposite),
            index,
            self.sentence_window,
            |_| true,
        )
        .ok_or(SkipReason::NoCounterpart)?;
        let counterpart = result
            .sentences(opposite)
            .get(target)
            .ok_or(SkipReason::NoCounterpart)?;

        let opp_tokens = result.tokens(opposite);
        let writes: Vec<(usize, String)> = result
            .sentence_mappings
            .indices(side, index)
            .iter()
            .zip(result.sentence_mappings.indices(opposite, target))
            .filter_map(|(&src, &dst)| opp_tokens.text_at(dst).map(|t| (src, t.to_string())))
            .collect();

        Ok(MergePlan {
            side,
            unit: MergeUnit::Sentence,
            selected_text: selected.clone(),
            counterpart_text: counterpart.clone(),
            writes,
            clears: Vec::new(),
            sentence_swap: Some((index, target)),
        })
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Perform the planned writes. Returns the indices actually replaced.
fn apply(result: &mut ComparisonResult, plan: &MergePlan) -> Vec<usize> {
    if let Some((source, target)) = plan.sentence_swap {
        let (own, other) = match plan.side {
            Side::Left => (&mut result.left_sentences, &mut result.right_sentences),
            Side::Right => (&mut result.right_sentences, &mut result.left_sentences),
        };
        if let (Some(a), Some(b)) = (own.get_mut(source), other.get_mut(target)) {
            std::mem::swap(a, b);
        }
        result.sentence_highlights_mut(plan.side).clear(source);
        result.sentence_highlights_mut(plan.side.opposite()).clear(target);
    }

    let (tokens, mask) = result.side_mut(plan.side);
    let mut replaced = Vec::with_capacity(plan.writes.len());
    for (index, text) in &plan.writes {
        // Blank counterparts are rejected by `replace`.
        if tokens.replace(*index, text) {
            mask.clear(*index);
            replaced.push(*index);
        }
    }
    for &index in &plan.clears {
        mask.clear(index);
    }
    replaced
}

/// Nearest index to `from` whose mask entry is set and which `accept`s,
/// checking `from + k` before `from - k` for k = 0, 1, 2, ...
///
/// The scan runs for `max(mask.len(), from + window)` offsets, which always
/// reaches both ends of the mask.
pub fn nearest_highlighted(
    mask: &HighlightMask,
    from: usize,
    window: usize,
    accept: impl Fn(usize) -> bool,
) -> Option<usize> {
    let hit = |i: usize| mask.get(i) && accept(i);
    let limit = mask.len().max(from + window);
    for offset in 0..limit {
        let forward = from + offset;
        if hit(forward) {
            return Some(forward);
        }
        if let Some(backward) = from.checked_sub(offset) {
            if hit(backward) {
                return Some(backward);
            }
        }
    }
    None
}

/// Drop chunks with no highlight left on either side; refresh the text
/// snapshots of the chunks that remain.
pub fn recompute_chunks(result: &mut ComparisonResult) {
    let ComparisonResult {
        chunks,
        left_tokens,
        right_tokens,
        left_highlights,
        right_highlights,
        ..
    } = result;

    chunks.retain(|c| left_highlights.any_in(c.left) || right_highlights.any_in(c.right));
    for chunk in chunks.iter_mut() {
        chunk.left_text = left_tokens.span_texts(chunk.left);
        chunk.right_text = right_tokens.span_texts(chunk.right);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
