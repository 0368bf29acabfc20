use proptest::prelude::*;
use tm_compare::{AlignmentStrategy, CompareConfig, CompareEngine, ComparisonResult, HighlightMode};
use tm_core::Side;
use tm_merge::{MergeEngine, Selection};

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z]{1,6}",
            "[A-Z][a-z]{0,5}[.!?]",
            Just(" ".to_string()),
            Just("\n".to_string()),
        ],
        1..30,
    )
    .prop_map(|parts| parts.concat())
}

fn selection() -> impl Strategy<Value = Selection> {
    (any::<bool>(), any::<bool>(), 0usize..40).prop_map(|(left, word, index)| {
        let side = if left { Side::Left } else { Side::Right };
        if word {
            Selection::word(side, index)
        } else {
            Selection::sentence(side, index % 6)
        }
    })
}

fn engine(content: bool, word_lcs: bool) -> CompareEngine {
    CompareEngine::new(CompareConfig {
        alignment: if content {
            AlignmentStrategy::ContentLcs
        } else {
            AlignmentStrategy::Positional
        },
        highlight_mode: if word_lcs {
            HighlightMode::WordLcs
        } else {
            HighlightMode::Chunks
        },
        ..CompareConfig::default()
    })
}

fn assert_consistent(r: &ComparisonResult) -> Result<(), TestCaseError> {
    prop_assert_eq!(r.left_highlights.len(), r.left_tokens.len());
    prop_assert_eq!(r.right_highlights.len(), r.right_tokens.len());
    prop_assert_eq!(r.removals, r.left_highlights.count());
    prop_assert_eq!(r.additions, r.right_highlights.count());
    for chunk in &r.chunks {
        prop_assert!(
            r.left_highlights.any_in(chunk.left) || r.right_highlights.any_in(chunk.right),
            "resolved chunk kept: {:?}",
            chunk
        );
        prop_assert_eq!(&chunk.left_text, &r.left_tokens.span_texts(chunk.left));
        prop_assert_eq!(&chunk.right_text, &r.right_tokens.span_texts(chunk.right));
    }
    Ok(())
}

proptest! {
    #[test]
    fn merges_never_resize_sequences(
        a in text(),
        b in text(),
        content in any::<bool>(),
        word_lcs in any::<bool>(),
        selections in prop::collection::vec(selection(), 1..12),
    ) {
        let mut r = engine(content, word_lcs).compare(&a, &b);
        let (left_len, right_len) = (r.left_tokens.len(), r.right_tokens.len());
        let (left_sentences, right_sentences) = (r.left_sentences.len(), r.right_sentences.len());
        let merger = MergeEngine::new();

        for s in &selections {
            merger.merge(&mut r, s);
            prop_assert_eq!(r.left_tokens.len(), left_len);
            prop_assert_eq!(r.right_tokens.len(), right_len);
            prop_assert_eq!(r.left_sentences.len(), left_sentences);
            prop_assert_eq!(r.right_sentences.len(), right_sentences);
            assert_consistent(&r)?;
        }
    }

    #[test]
    fn merging_a_resolved_selection_twice_changes_nothing(
        a in text(),
        b in text(),
        content in any::<bool>(),
        s in selection(),
    ) {
        let mut r = engine(content, false).compare(&a, &b);
        let merger = MergeEngine::new();
        merger.merge(&mut r, &s);
        let once = r.clone();
        merger.merge(&mut r, &s);
        prop_assert_eq!(r, once);
    }

    #[test]
    fn highlight_counts_never_grow(
        a in text(),
        b in text(),
        selections in prop::collection::vec(selection(), 1..8),
    ) {
        let mut r = engine(false, false).compare(&a, &b);
        let merger = MergeEngine::new();
        for s in &selections {
            let before = (r.additions, r.removals);
            merger.merge(&mut r, s);
            prop_assert!(r.additions <= before.0);
            prop_assert!(r.removals <= before.1);
        }
    }
}
