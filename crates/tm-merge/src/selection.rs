use serde::{Deserialize, Serialize};

use tm_core::Side;

/// A unit picked by the user for merging.
///
/// Serialized with a `unit` tag:
/// `{"unit":"word","side":"left","index":4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum Selection {
    /// A token index on `side`. When the token lies in a retained chunk the
    /// whole chunk is merged.
    Word { side: Side, index: usize },
    /// A sentence index on `side`.
    Sentence { side: Side, index: usize },
}

impl Selection {
    pub fn word(side: Side, index: usize) -> Self {
        Selection::Word { side, index }
    }

    pub fn sentence(side: Side, index: usize) -> Self {
        Selection::Sentence { side, index }
    }

    pub fn side(&self) -> Side {
        match self {
            Selection::Word { side, .. } | Selection::Sentence { side, .. } => *side,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Selection::Word { index, .. } | Selection::Sentence { index, .. } => *index,
        }
    }
}
