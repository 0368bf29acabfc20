//! Human-readable labels for differing chunks.
//!
//! Rules are tried in order: a verb marker present on exactly one side, a
//! noun marker present on exactly one side, differing word counts, an
//! average per-position word similarity above 0.7, and finally a generic
//! change. Chunks with one empty side are insertions or deletions.

use serde::{Deserialize, Serialize};

use tm_core::{is_blank, HeuristicTables};

use crate::result::DiffChunk;
use crate::similarity::word_similarity;

/// Average word similarity above which a change counts as a rewording.
const EQUIVALENCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    VerbChange,
    NounChange,
    StructureChange,
    SemanticEquivalent,
    GeneralChange,
    Insertion,
    Deletion,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::VerbChange => "verb change",
            ChangeKind::NounChange => "noun change",
            ChangeKind::StructureChange => "restructured",
            ChangeKind::SemanticEquivalent => "equivalent wording",
            ChangeKind::GeneralChange => "changed",
            ChangeKind::Insertion => "inserted",
            ChangeKind::Deletion => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeExplanation {
    /// Position of the chunk in `ComparisonResult::chunks`.
    pub chunk_index: usize,
    pub kind: ChangeKind,
    pub left_text: String,
    pub right_text: String,
    pub message: String,
}

/// Explain every retained chunk, in chunk order.
pub fn explain_chunks(chunks: &[DiffChunk], tables: &HeuristicTables) -> Vec<ChangeExplanation> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| explain_chunk(i, chunk, tables))
        .collect()
}

pub fn explain_chunk(
    chunk_index: usize,
    chunk: &DiffChunk,
    tables: &HeuristicTables,
) -> ChangeExplanation {
    let left_words = content_words(&chunk.left_text);
    let right_words = content_words(&chunk.right_text);
    let left_text = left_words.join(" ");
    let right_text = right_words.join(" ");

    let kind = classify_change(&left_words, &right_words, tables);
    let message = match kind {
        ChangeKind::Insertion => format!("{}: \"{right_text}\"", kind.label()),
        ChangeKind::Deletion => format!("{}: \"{left_text}\"", kind.label()),
        _ => format!("{}: \"{left_text}\" -> \"{right_text}\"", kind.label()),
    };

    ChangeExplanation {
        chunk_index,
        kind,
        left_text,
        right_text,
        message,
    }
}

pub fn classify_change(left: &[&str], right: &[&str], tables: &HeuristicTables) -> ChangeKind {
    match (left.is_empty(), right.is_empty()) {
        (true, false) => return ChangeKind::Insertion,
        (false, true) => return ChangeKind::Deletion,
        _ => {}
    }

    let left_joined = left.join(" ").to_lowercase();
    let right_joined = right.join(" ").to_lowercase();
    let one_sided = |marker: &String| {
        left_joined.contains(marker.as_str()) != right_joined.contains(marker.as_str())
    };

    if tables.explain.verb_markers.iter().any(one_sided) {
        return ChangeKind::VerbChange;
    }
    if tables.explain.noun_markers.iter().any(one_sided) {
        return ChangeKind::NounChange;
    }
    if left.len() != right.len() {
        return ChangeKind::StructureChange;
    }

    let shared = left.len().min(right.len());
    let average = if shared == 0 {
        0.0
    } else {
        left.iter()
            .zip(right)
            .map(|(a, b)| word_similarity(a, b, tables))
            .sum::<f64>()
            / shared as f64
    };
    if average > EQUIVALENCE_THRESHOLD {
        ChangeKind::SemanticEquivalent
    } else {
        ChangeKind::GeneralChange
    }
}

fn content_words(text: &[String]) -> Vec<&str> {
    text.iter()
        .map(String::as_str)
        .filter(|t| !is_blank(t))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tm_core::TokenSpan;

    fn chunk(left: &[&str], right: &[&str]) -> DiffChunk {
        DiffChunk {
            left: TokenSpan::new(0, left.len()),
            right: TokenSpan::new(0, right.len()),
            left_text: left.iter().map(|s| s.to_string()).collect(),
            right_text: right.iter().map(|s| s.to_string()).collect(),
            similarity: 0.0,
        }
    }

    fn kind(left: &[&str], right: &[&str]) -> ChangeKind {
        classify_change(left, right, &HeuristicTables::default())
    }

    #[test]
    fn verb_marker_wins() {
        assert_eq!(kind(&["continues"], &["keeps"]), ChangeKind::VerbChange);
    }

    #[test]
    fn noun_marker_after_verbs() {
        assert_eq!(kind(&["humans"], &["people"]), ChangeKind::NounChange);
    }

    #[test]
    fn marker_on_both_sides_is_not_a_change() {
        // "change" appears on both sides, so only the word count differs.
        assert_eq!(kind(&["change", "now"], &["change"]), ChangeKind::StructureChange);
    }

    #[test]
    fn markers_ignore_case() {
        // Sentence-initial capitals still count as the marker word.
        assert_eq!(kind(&["Continues"], &["Keeps"]), ChangeKind::VerbChange);
        assert_eq!(kind(&["Humans"], &["PEOPLE"]), ChangeKind::NounChange);
        // "Change" and "change" are the same marker, present on both sides.
        assert_eq!(kind(&["Change", "now"], &["change"]), ChangeKind::StructureChange);
    }

    #[test]
    fn rewording_is_equivalent() {
        assert_eq!(kind(&["colour"], &["color"]), ChangeKind::SemanticEquivalent);
    }

    #[test]
    fn unrelated_words_are_general() {
        assert_eq!(kind(&["apple"], &["zebra"]), ChangeKind::GeneralChange);
    }

    #[test]
    fn one_sided_chunks() {
        assert_eq!(kind(&[], &["new"]), ChangeKind::Insertion);
        assert_eq!(kind(&["old"], &[]), ChangeKind::Deletion);
    }

    #[test]
    fn explanation_skips_whitespace_and_formats_message() {
        let tables = HeuristicTables::default();
        let e = explain_chunk(
            3,
            &chunk(&["one", " ", "another."], &["each", " ", "other."]),
            &tables,
        );
        assert_eq!(e.chunk_index, 3);
        assert_eq!(e.left_text, "one another.");
        assert_eq!(e.right_text, "each other.");
        assert_eq!(e.kind, ChangeKind::GeneralChange);
        assert_eq!(e.message, "changed: \"one another.\" -> \"each other.\"");
    }

    #[test]
    fn insertion_message_names_right_text() {
        let tables = HeuristicTables::default();
        let e = explain_chunk(0, &chunk(&[], &["brand", " ", "new"]), &tables);
        assert_eq!(e.message, "inserted: \"brand new\"");
    }

    #[test]
    fn explain_chunks_keeps_order() {
        let tables = HeuristicTables::default();
        let chunks = vec![chunk(&["a"], &[]), chunk(&[], &["b"])];
        let out = explain_chunks(&chunks, &tables);
        assert_eq!(
            out.iter().map(|e| e.kind).collect::<Vec<_>>(),
            vec![ChangeKind::Deletion, ChangeKind::Insertion]
        );
    }
}
