pub mod align;
pub mod chunk;
pub mod explain;
pub mod lcs;
pub mod mapping;
pub mod result;
pub mod sentence;
pub mod similarity;
pub mod tokenize;
pub mod worker;

pub use align::AlignmentStrategy;
pub use result::*;
pub use similarity::{semantic_similarity, text_jaccard, SimilarityOracle};
pub use worker::{CompareConfig, CompareEngine, HighlightMode};
