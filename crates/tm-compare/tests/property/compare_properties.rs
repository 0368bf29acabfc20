use proptest::prelude::*;
use tm_compare::tokenize::tokenize_structural;
use tm_compare::{AlignmentStrategy, CompareConfig, CompareEngine, HighlightMode};
use tm_core::Side;

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z]{1,8}[.!?,]?",
            Just(" ".to_string()),
            Just("  ".to_string()),
            Just("\n".to_string()),
            Just("\t".to_string()),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

fn engines() -> Vec<CompareEngine> {
    let mut out = Vec::new();
    for alignment in [AlignmentStrategy::Positional, AlignmentStrategy::ContentLcs] {
        for highlight_mode in [HighlightMode::Chunks, HighlightMode::WordLcs] {
            out.push(CompareEngine::new(CompareConfig {
                alignment,
                highlight_mode,
                ..CompareConfig::default()
            }));
        }
    }
    out
}

proptest! {
    #[test]
    fn tokenizer_round_trips(s in ".*") {
        prop_assert_eq!(tokenize_structural(&s).concat(), s);
    }

    #[test]
    fn structured_text_round_trips(s in text()) {
        prop_assert_eq!(tokenize_structural(&s).concat(), s);
    }

    #[test]
    fn comparing_text_with_itself_is_clean(s in text()) {
        for engine in engines() {
            let r = engine.compare(&s, &s);
            prop_assert_eq!(r.additions, 0);
            prop_assert_eq!(r.removals, 0);
            prop_assert_eq!(r.similarity, 1.0);
            prop_assert!(r.chunks.is_empty());
        }
    }

    #[test]
    fn masks_match_sequences_and_chunks_fit(a in text(), b in text()) {
        for engine in engines() {
            let r = engine.compare(&a, &b);
            prop_assert_eq!(r.left_highlights.len(), r.left_tokens.len());
            prop_assert_eq!(r.right_highlights.len(), r.right_tokens.len());
            prop_assert_eq!(r.left_sentence_highlights.len(), r.left_sentences.len());
            prop_assert_eq!(r.right_sentence_highlights.len(), r.right_sentences.len());
            for chunk in &r.chunks {
                prop_assert!(chunk.left.fits(r.left_tokens.len()), "{:?}", chunk);
                prop_assert!(chunk.right.fits(r.right_tokens.len()), "{:?}", chunk);
                prop_assert!(!chunk.left.is_empty() || !chunk.right.is_empty());
            }
            prop_assert_eq!(r.removals, r.left_highlights.count());
            prop_assert_eq!(r.additions, r.right_highlights.count());
        }
    }

    #[test]
    fn sentence_mappings_are_increasing_content_indices(a in text(), b in text()) {
        let r = CompareEngine::default().compare(&a, &b);
        for side in [Side::Left, Side::Right] {
            let tokens = r.tokens(side);
            prop_assert_eq!(r.sentence_mappings.for_side(side).len(), r.sentences(side).len());
            for indices in r.sentence_mappings.for_side(side) {
                prop_assert!(indices.windows(2).all(|w| w[0] < w[1]), "{:?}", indices);
                for &i in indices {
                    prop_assert!(tokens.get(i).is_some_and(|t| !t.is_whitespace()));
                }
            }
        }
    }
}
