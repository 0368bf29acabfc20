//! Structure-preserving tokenizer and sentence splitter.
//!
//! [`tokenize_structural`] is lossless: concatenating the produced tokens in
//! order yields the input byte for byte. Every `\n` becomes its own
//! whitespace token so line structure survives merges; any other run of
//! whitespace (indentation included) becomes a single whitespace token.
//!
//! Example:
//!   "  Hello world.\nBye" →
//!   [␣␣][Hello][␣][world.][\n][Bye]
//!
//! [`tokenize_sentences`] is lossy and only feeds the sentence view.

use tm_core::{Token, TokenSequence};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split `text` into content and whitespace tokens without dropping anything.
pub fn tokenize_structural(text: &str) -> TokenSequence {
    let mut tokens = Vec::new();
    let mut run_start = 0usize;
    let mut run_is_space: Option<bool> = None;

    for (offset, ch) in text.char_indices() {
        if ch == '\n' {
            flush(text, run_start, offset, run_is_space, &mut tokens);
            tokens.push(Token::whitespace("\n"));
            run_start = offset + ch.len_utf8();
            run_is_space = None;
            continue;
        }

        let is_space = ch.is_whitespace();
        if run_is_space != Some(is_space) {
            flush(text, run_start, offset, run_is_space, &mut tokens);
            run_start = offset;
            run_is_space = Some(is_space);
        }
    }
    flush(text, run_start, text.len(), run_is_space, &mut tokens);

    TokenSequence::new(tokens)
}

/// Split `text` into trimmed sentences.
///
/// A boundary is a `.`, `!` or `?` followed by a whitespace run that is
/// itself followed by an ASCII uppercase letter or the end of the text.
/// Empty pieces are dropped.
pub fn tokenize_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut piece_start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (_, ch) = chars[i];
        if !is_terminal(ch) {
            i += 1;
            continue;
        }

        // Measure the whitespace run after the terminal character.
        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        let has_gap = j > i + 1;
        let at_boundary = j == chars.len() || chars[j].1.is_ascii_uppercase();

        if has_gap && at_boundary {
            let gap_start = chars[i + 1].0;
            push_trimmed(&text[piece_start..gap_start], &mut sentences);
            piece_start = if j == chars.len() { text.len() } else { chars[j].0 };
            i = j;
        } else {
            i += 1;
        }
    }
    push_trimmed(&text[piece_start..], &mut sentences);

    sentences
}

/// Lower-cased, whitespace-split words of a sentence or free text.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn flush(text: &str, start: usize, end: usize, is_space: Option<bool>, out: &mut Vec<Token>) {
    if start >= end {
        return;
    }
    let slice = &text[start..end];
    match is_space {
        Some(true) => out.push(Token::whitespace(slice)),
        Some(false) => out.push(Token::content(slice)),
        None => {}
    }
}

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn push_trimmed(piece: &str, out: &mut Vec<String>) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
