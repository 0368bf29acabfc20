use serde::{Deserialize, Serialize};

use crate::span::TokenSpan;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which of the two compared texts a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

// ---------------------------------------------------------------------------
// TokenKind / Token
// ---------------------------------------------------------------------------

/// Whether a token carries text or only spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A run of non-whitespace characters.
    Content,
    /// A run of whitespace, or a single line break, kept verbatim.
    Whitespace,
}

/// Atomic unit of text produced by the structural tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Raw text exactly as it appears in the input.
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    /// Build a token, classifying it from its text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if is_blank(&text) {
            TokenKind::Whitespace
        } else {
            TokenKind::Content
        };
        Self { text, kind }
    }

    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Content,
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Whitespace,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Lower-cased form used for every case-insensitive comparison.
    pub fn normalized(&self) -> String {
        self.text.to_lowercase()
    }
}

/// `true` for the empty string and for strings made only of whitespace.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

// ---------------------------------------------------------------------------
// TokenSequence
// ---------------------------------------------------------------------------

/// Ordered tokens of one side.
///
/// The length is fixed once produced: merges overwrite token text at existing
/// indices and never insert or remove, so chunk spans and sentence mappings
/// computed against the sequence stay valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Token texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Texts of the tokens inside `span`, whitespace included.
    pub fn span_texts(&self, span: TokenSpan) -> Vec<String> {
        span.range()
            .filter_map(|i| self.tokens.get(i))
            .map(|t| t.text.clone())
            .collect()
    }

    /// Indices of every content token, in order.
    pub fn content_indices(&self) -> Vec<usize> {
        self.content_indices_in(TokenSpan::new(0, self.len()))
    }

    /// Indices of the content tokens inside `span`, in order.
    pub fn content_indices_in(&self, span: TokenSpan) -> Vec<usize> {
        span.range()
            .filter(|&i| self.tokens.get(i).is_some_and(|t| !t.is_whitespace()))
            .collect()
    }

    /// Overwrite the text at `index` without changing the sequence length.
    ///
    /// Returns `false` (and leaves the sequence untouched) when `index` is out
    /// of range or `text` is blank.
    pub fn replace(&mut self, index: usize, text: &str) -> bool {
        if is_blank(text) {
            return false;
        }
        match self.tokens.get_mut(index) {
            Some(slot) => {
                *slot = Token::content(text);
                true
            }
            None => false,
        }
    }

    /// Concatenation of every token; equals the tokenized input until a merge
    /// rewrites a slot.
    pub fn concat(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

impl FromIterator<Token> for TokenSequence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

// ---------------------------------------------------------------------------
// HighlightMask
// ---------------------------------------------------------------------------

/// Boolean flags parallel to a token (or sentence) sequence; `true` marks an
/// unresolved difference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightMask {
    bits: Vec<bool>,
}

impl HighlightMask {
    /// A mask of `len` entries, none highlighted.
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// `false` for indices past the end.
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize, value: bool) {
        debug_assert!(
            index < self.bits.len(),
            "highlight index {index} out of range for mask of {}",
            self.bits.len()
        );
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = value;
        }
    }

    pub fn clear(&mut self, index: usize) {
        self.set(index, false);
    }

    /// Highlight every index of `span`.
    pub fn mark(&mut self, span: TokenSpan) {
        for i in span.range() {
            self.set(i, true);
        }
    }

    /// Number of highlighted entries.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// `true` if any index of `span` is highlighted.
    pub fn any_in(&self, span: TokenSpan) -> bool {
        span.range().any(|i| self.get(i))
    }

    pub fn highlighted_indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
            .collect()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(texts: &[&str]) -> TokenSequence {
        texts.iter().map(|t| Token::new(*t)).collect()
    }

    #[test]
    fn token_new_classifies_whitespace() {
        assert_eq!(Token::new("word").kind, TokenKind::Content);
        assert_eq!(Token::new("  ").kind, TokenKind::Whitespace);
        assert_eq!(Token::new("\n").kind, TokenKind::Whitespace);
    }

    #[test]
    fn side_opposite_flips() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn content_indices_skip_whitespace() {
        let seq = sequence(&["a", " ", "b", "\n", "c"]);
        assert_eq!(seq.content_indices(), vec![0, 2, 4]);
        assert_eq!(seq.content_indices_in(TokenSpan::inclusive(1, 3)), vec![2]);
    }

    #[test]
    fn replace_keeps_length() {
        let mut seq = sequence(&["a", " ", "b"]);
        assert!(seq.replace(2, "c"));
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.concat(), "a c");
    }

    #[test]
    fn replace_rejects_blank_and_out_of_range() {
        let mut seq = sequence(&["a", " ", "b"]);
        assert!(!seq.replace(0, "  "));
        assert!(!seq.replace(0, ""));
        assert!(!seq.replace(7, "x"));
        assert_eq!(seq.concat(), "a b");
    }

    #[test]
    fn mask_counts_and_spans() {
        let mut mask = HighlightMask::new(5);
        mask.mark(TokenSpan::inclusive(1, 2));
        assert_eq!(mask.count(), 2);
        assert!(mask.any_in(TokenSpan::inclusive(0, 1)));
        assert!(!mask.any_in(TokenSpan::inclusive(3, 4)));
        mask.clear(1);
        assert_eq!(mask.highlighted_indices(), vec![2]);
    }

    #[test]
    fn mask_get_out_of_range_is_false() {
        let mask = HighlightMask::from_bits(vec![true]);
        assert!(mask.get(0));
        assert!(!mask.get(9));
    }

    #[test]
    fn sequence_serializes_as_array() {
        let seq = sequence(&["a", " "]);
        let json = serde_json::to_string(&seq).expect("serialize");
        assert_eq!(
            json,
            r#"[{"text":"a","kind":"content"},{"text":" ","kind":"whitespace"}]"#
        );
        let mask = HighlightMask::from_bits(vec![true, false]);
        assert_eq!(serde_json::to_string(&mask).expect("serialize"), "[true,false]");
    }
}
