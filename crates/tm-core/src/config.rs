//! Heuristic lookup tables driving chunk classification, coherence scoring,
//! word similarity and change explanations.
//!
//! [`HeuristicTables::default`] carries the built-in English tables. Every
//! section is `#[serde(default)]`, so a TOML file only needs to name the
//! tables it overrides:
//!
//! ```toml
//! [categories]
//! nouns = ["contract", "party", "clause"]
//!
//! [scores]
//! fallback = 0.25
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TmError};

/// An unordered pair of lower-cased words.
pub type WordPair = [String; 2];

// ---------------------------------------------------------------------------
// CategoryTables
// ---------------------------------------------------------------------------

/// Closed word lists used to assign a heuristic part-of-speech category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTables {
    pub verbs: Vec<String>,
    /// Any word ending in one of these suffixes is treated as verb-like.
    pub verb_suffixes: Vec<String>,
    pub nouns: Vec<String>,
    pub adjectives: Vec<String>,
    pub prepositions: Vec<String>,
    pub articles: Vec<String>,
    /// Words that start a new phrase inside an unmatched stretch.
    pub phrase_openers: Vec<String>,
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self {
            verbs: words(&[
                "continue",
                "transform",
                "change",
                "keep",
                "interact",
                "communicate",
                "revolutionize",
                "innovate",
            ]),
            verb_suffixes: words(&["ing", "ed", "s"]),
            nouns: words(&[
                "technology",
                "way",
                "human",
                "people",
                "information",
                "society",
                "world",
                "time",
                "era",
            ]),
            adjectives: words(&[
                "modern",
                "contemporary",
                "essential",
                "important",
                "revolutionary",
                "innovative",
                "digital",
            ]),
            prepositions: words(&[
                "the", "a", "an", "in", "on", "at", "by", "for", "with", "to", "from", "of",
            ]),
            articles: words(&["the", "a", "an"]),
            phrase_openers: words(&[
                "the", "a", "an", "this", "that", "these", "those", "how", "what", "which", "who",
                "where", "when", "why",
            ]),
        }
    }
}

impl CategoryTables {
    /// `word` must already be lower-cased.
    pub fn is_verb(&self, word: &str) -> bool {
        contains(&self.verbs, word) || self.verb_suffixes.iter().any(|s| word.ends_with(s.as_str()))
    }

    pub fn is_noun(&self, word: &str) -> bool {
        contains(&self.nouns, word)
    }

    pub fn is_adjective(&self, word: &str) -> bool {
        contains(&self.adjectives, word)
    }

    /// Prepositions and articles share one category.
    pub fn is_preposition(&self, word: &str) -> bool {
        contains(&self.prepositions, word) || contains(&self.articles, word)
    }

    pub fn is_phrase_opener(&self, word: &str) -> bool {
        contains(&self.phrase_openers, word)
    }
}

// ---------------------------------------------------------------------------
// CoherenceScores / WindowCaps
// ---------------------------------------------------------------------------

/// Scores awarded to adjacent token pairs inside a candidate chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceScores {
    /// Adjacent pair is a listed bigram pattern (either order).
    pub pattern: f64,
    /// Both words appear in one semantic-relation pair.
    pub relation: f64,
    /// Anything else.
    pub fallback: f64,
    /// Score of a one-token window.
    pub single_token: f64,
}

impl Default for CoherenceScores {
    fn default() -> Self {
        Self {
            pattern: 1.0,
            relation: 0.7,
            fallback: 0.3,
            single_token: 1.0,
        }
    }
}

/// Maximum chunk length, keyed by the category of the chunk's first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowCaps {
    pub verb: usize,
    pub noun: usize,
    pub adjective: usize,
    pub preposition: usize,
    pub other: usize,
}

impl Default for WindowCaps {
    fn default() -> Self {
        Self {
            verb: 3,
            noun: 2,
            adjective: 3,
            preposition: 4,
            other: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// ExplainTables
// ---------------------------------------------------------------------------

/// Marker words used to label a differing chunk as a verb or noun change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainTables {
    pub verb_markers: Vec<String>,
    pub noun_markers: Vec<String>,
}

impl Default for ExplainTables {
    fn default() -> Self {
        Self {
            verb_markers: words(&[
                "transform",
                "change",
                "continues",
                "keeps",
                "changing",
                "transforming",
            ]),
            noun_markers: words(&[
                "humans",
                "people",
                "individuals",
                "society",
                "world",
                "community",
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// HeuristicTables
// ---------------------------------------------------------------------------

/// Every swappable lookup table consumed by the diff engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicTables {
    pub categories: CategoryTables,
    /// Common bigrams, matched in either order.
    pub patterns: Vec<WordPair>,
    /// Loosely related words; a pair matches when it contains both words.
    pub relations: Vec<WordPair>,
    /// Near-synonyms scored below an exact match by word similarity.
    pub synonyms: Vec<WordPair>,
    pub scores: CoherenceScores,
    pub caps: WindowCaps,
    pub explain: ExplainTables,
}

impl Default for HeuristicTables {
    fn default() -> Self {
        Self {
            categories: CategoryTables::default(),
            patterns: pairs(&[
                ("the", "way"),
                ("continue", "to"),
                ("transform", "the"),
                ("interact", "with"),
                ("in", "the"),
                ("with", "information"),
                ("and", "with"),
                ("each", "other"),
                ("one", "another"),
            ]),
            relations: pairs(&[
                ("continue", "transform"),
                ("keep", "change"),
                ("modern", "technology"),
                ("human", "interact"),
                ("people", "interact"),
                ("information", "society"),
            ]),
            synonyms: pairs(&[
                ("continue", "keep"),
                ("transform", "change"),
                ("modern", "contemporary"),
                ("humans", "people"),
                ("society", "world"),
                ("essential", "important"),
                ("revolutionary", "innovative"),
                ("digital", "technological"),
                ("one", "another"),
                ("each", "other"),
                ("the", "a"),
                ("way", "how"),
            ]),
            scores: CoherenceScores::default(),
            caps: WindowCaps::default(),
            explain: ExplainTables::default(),
        }
    }
}

impl HeuristicTables {
    /// Parse tables from a TOML document and validate them.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let tables: Self =
            toml::from_str(toml_str).map_err(|e| TmError::Config(format!("<string>: {e}")))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tables: Self = toml::from_str(&content)
            .map_err(|e| TmError::Config(format!("{}: {e}", path.display())))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Reject scores outside [0, 1] and zero window caps.
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("scores.pattern", self.scores.pattern),
            ("scores.relation", self.scores.relation),
            ("scores.fallback", self.scores.fallback),
            ("scores.single_token", self.scores.single_token),
        ];
        for (field, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(TmError::Config(format!(
                    "{field} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }

        let caps = [
            ("caps.verb", self.caps.verb),
            ("caps.noun", self.caps.noun),
            ("caps.adjective", self.caps.adjective),
            ("caps.preposition", self.caps.preposition),
            ("caps.other", self.caps.other),
        ];
        for (field, value) in caps {
            if value == 0 {
                return Err(TmError::Config(format!("{field} must be at least 1")));
            }
        }
        Ok(())
    }

    /// `true` when `(a, b)` is a listed bigram in either order.
    pub fn is_pattern(&self, a: &str, b: &str) -> bool {
        self.patterns
            .iter()
            .any(|[x, y]| (x == a && y == b) || (x == b && y == a))
    }

    /// `true` when one relation pair contains both `a` and `b`.
    pub fn is_related(&self, a: &str, b: &str) -> bool {
        pair_contains_both(&self.relations, a, b)
    }

    /// `true` when one synonym pair contains both `a` and `b`.
    pub fn are_synonyms(&self, a: &str, b: &str) -> bool {
        pair_contains_both(&self.synonyms, a, b)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn pairs(list: &[(&str, &str)]) -> Vec<WordPair> {
    list.iter().map(|(a, b)| [a.to_string(), b.to_string()]).collect()
}

fn contains(list: &[String], word: &str) -> bool {
    list.iter().any(|w| w == word)
}

fn pair_contains_both(list: &[WordPair], a: &str, b: &str) -> bool {
    list.iter().any(|pair| contains(pair, a) && contains(pair, b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_tables_validate() {
        HeuristicTables::default().validate().expect("defaults are valid");
    }

    #[test]
    fn verb_suffix_rule_applies() {
        let cats = CategoryTables::default();
        assert!(cats.is_verb("continue"));
        assert!(cats.is_verb("changing"));
        assert!(cats.is_verb("humans"));
        assert!(!cats.is_verb("modern"));
    }

    #[test]
    fn articles_count_as_prepositions() {
        let mut cats = CategoryTables::default();
        cats.prepositions.clear();
        assert!(cats.is_preposition("the"));
        assert!(!cats.is_preposition("with"));
    }

    #[test]
    fn phrase_openers_cover_articles_and_wh_words() {
        let cats = CategoryTables::default();
        assert!(cats.is_phrase_opener("the"));
        assert!(cats.is_phrase_opener("how"));
        assert!(!cats.is_phrase_opener("with"));
    }

    #[test]
    fn patterns_match_both_orders() {
        let tables = HeuristicTables::default();
        assert!(tables.is_pattern("the", "way"));
        assert!(tables.is_pattern("way", "the"));
        assert!(!tables.is_pattern("way", "humans"));
    }

    #[test]
    fn relations_and_synonyms_need_both_words() {
        let tables = HeuristicTables::default();
        assert!(tables.is_related("interact", "people"));
        assert!(!tables.is_related("interact", "society"));
        assert!(tables.are_synonyms("people", "humans"));
        assert!(!tables.are_synonyms("people", "human"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let tables = HeuristicTables::from_toml(
            r#"
            [categories]
            nouns = ["contract"]

            [scores]
            fallback = 0.25
            "#,
        )
        .expect("parse");
        assert_eq!(tables.categories.nouns, vec!["contract".to_string()]);
        assert_eq!(tables.categories.verbs, CategoryTables::default().verbs);
        assert!((tables.scores.fallback - 0.25).abs() < 1e-9);
        assert!((tables.scores.pattern - 1.0).abs() < 1e-9);
        assert_eq!(tables.synonyms.len(), 12);
    }

    #[test]
    fn toml_pairs_parse_as_arrays() {
        let tables = HeuristicTables::from_toml(r#"synonyms = [["big", "large"]]"#).expect("parse");
        assert!(tables.are_synonyms("large", "big"));
        assert!(!tables.are_synonyms("the", "a"));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let err = HeuristicTables::from_toml("[scores]\nrelation = 1.5\n").unwrap_err();
        assert!(matches!(err, TmError::Config(ref m) if m.contains("scores.relation")), "{err:?}");
    }

    #[test]
    fn zero_cap_is_rejected() {
        let err = HeuristicTables::from_toml("[caps]\nnoun = 0\n").unwrap_err();
        assert!(matches!(err, TmError::Config(ref m) if m.contains("caps.noun")), "{err:?}");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = HeuristicTables::from_toml("patterns = [[").unwrap_err();
        assert!(matches!(err, TmError::Config(_)), "{err:?}");
    }

    #[test]
    fn loads_tables_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[caps]\nother = 2").expect("write");
        let tables = HeuristicTables::from_toml_file(file.path()).expect("load");
        assert_eq!(tables.caps.other, 2);
        assert_eq!(tables.caps.preposition, 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err =
            HeuristicTables::from_toml_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, TmError::Io(_)), "{err:?}");
    }
}
