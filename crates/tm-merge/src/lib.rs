pub mod merge;
pub mod selection;

pub use merge::{MergeEngine, MergeOutcome, MergePreview, MergeUnit, SkipReason};
pub use selection::Selection;
