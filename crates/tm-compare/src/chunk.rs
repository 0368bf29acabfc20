//! Heuristic chunk segmentation.
//!
//! Each side is segmented on its own. From every unconsumed position the
//! classifier tries windows of 1 up to a cap that depends on the category of
//! the first token, scores each window by the average coherence of its
//! adjacent token pairs, and keeps the window with the strictly highest
//! score (ties keep the shorter window). Whitespace tokens take part in
//! segmentation like any other token.

use serde::{Deserialize, Serialize};

use tm_core::{is_blank, HeuristicTables, TokenSequence, TokenSpan};

// ---------------------------------------------------------------------------
// WordCategory
// ---------------------------------------------------------------------------

/// Coarse part-of-speech guess from the lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordCategory {
    Verb,
    Noun,
    Adjective,
    /// Prepositions and articles.
    Preposition,
    Other,
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// A contiguous run of tokens grouped as one unit on one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub span: TokenSpan,
    /// Token texts inside `span`, whitespace included.
    pub text: Vec<String>,
    /// Most frequent category among the chunk's tokens.
    pub category: WordCategory,
}

impl Chunk {
    /// Lower-cased concatenation of the chunk's tokens.
    pub fn normalized(&self) -> String {
        self.text.concat().to_lowercase()
    }

    /// `true` when every token of the chunk is whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.iter().all(|t| is_blank(t))
    }

    /// Non-whitespace token texts, in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.iter().map(String::as_str).filter(|t| !is_blank(t))
    }
}

// ---------------------------------------------------------------------------
// ChunkClassifier
// ---------------------------------------------------------------------------

/// Segments a token sequence into chunks using a set of [`HeuristicTables`].
pub struct ChunkClassifier<'a> {
    tables: &'a HeuristicTables,
}

impl<'a> ChunkClassifier<'a> {
    pub fn new(tables: &'a HeuristicTables) -> Self {
        Self { tables }
    }

    /// Category of a single word. Verb wins over noun, noun over adjective,
    /// adjective over preposition.
    pub fn classify(&self, word: &str) -> WordCategory {
        let word = word.to_lowercase();
        let cats = &self.tables.categories;
        if cats.is_verb(&word) {
            WordCategory::Verb
        } else if cats.is_noun(&word) {
            WordCategory::Noun
        } else if cats.is_adjective(&word) {
            WordCategory::Adjective
        } else if cats.is_preposition(&word) {
            WordCategory::Preposition
        } else {
            WordCategory::Other
        }
    }

    /// Longest window allowed when a chunk starts with `word`.
    pub fn window_cap(&self, word: &str) -> usize {
        let caps = &self.tables.caps;
        match self.classify(word) {
            WordCategory::Verb => caps.verb,
            WordCategory::Noun => caps.noun,
            WordCategory::Adjective => caps.adjective,
            WordCategory::Preposition => caps.preposition,
            WordCategory::Other => caps.other,
        }
    }

    /// Average pairwise coherence of adjacent words.
    pub fn coherence<S: AsRef<str>>(&self, words: &[S]) -> f64 {
        let scores = &self.tables.scores;
        if words.len() <= 1 {
            return scores.single_token;
        }
        let total: f64 = words
            .windows(2)
            .map(|pair| {
                let a = pair[0].as_ref().to_lowercase();
                let b = pair[1].as_ref().to_lowercase();
                if self.tables.is_pattern(&a, &b) {
                    scores.pattern
                } else if self.tables.is_related(&a, &b) {
                    scores.relation
                } else {
                    scores.fallback
                }
            })
            .sum();
        total / (words.len() - 1) as f64
    }

    /// Dominant category of a word run. Counts are kept in first-appearance
    /// order and a tie goes to the category that appeared later.
    pub fn dominant_category<S: AsRef<str>>(&self, words: &[S]) -> WordCategory {
        let mut counts: Vec<(WordCategory, usize)> = Vec::new();
        for word in words {
            let category = self.classify(word.as_ref());
            match counts.iter_mut().find(|(c, _)| *c == category) {
                Some(entry) => entry.1 += 1,
                None => counts.push((category, 1)),
            }
        }
        counts
            .into_iter()
            .reduce(|best, next| if best.1 > next.1 { best } else { next })
            .map(|(category, _)| category)
            .unwrap_or(WordCategory::Other)
    }

    /// Split `tokens` into consecutive, non-overlapping chunks that cover
    /// every index exactly once.
    pub fn segment(&self, tokens: &TokenSequence) -> Vec<Chunk> {
        let texts = tokens.texts();
        let mut chunks = Vec::new();
        let mut cursor = 0usize;

        while cursor < texts.len() {
            let remaining = texts.len() - cursor;
            let cap = self.window_cap(texts[cursor]).min(remaining);

            let mut best_size = 1usize;
            let mut best_coherence = 0.0f64;
            for size in 1..=cap {
                let coherence = self.coherence(&texts[cursor..cursor + size]);
                if coherence > best_coherence {
                    best_coherence = coherence;
                    best_size = size;
                }
            }

            let window = &texts[cursor..cursor + best_size];
            chunks.push(Chunk {
                span: TokenSpan::new(cursor, best_size),
                text: window.iter().map(|t| t.to_string()).collect(),
                category: self.dominant_category(window),
            });
            cursor += best_size;
        }

        chunks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
