use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A contiguous run of token indices on one side of a comparison.
///
/// Stored as `start` plus `len` so that an empty run (a pure insertion or
/// deletion counterpart) needs no sentinel end index. For an empty span
/// `start` carries no meaning beyond where the run would begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenSpan {
    /// Index of the first token in the run.
    pub start: usize,
    /// Number of tokens in the run; `0` for an empty span.
    pub len: usize,
}

impl TokenSpan {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Span covering exactly one token.
    pub fn single(index: usize) -> Self {
        Self { start: index, len: 1 }
    }

    /// The empty span anchored at index 0.
    pub fn empty() -> Self {
        Self { start: 0, len: 0 }
    }

    /// Span covering `first..=last`.
    pub fn inclusive(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "inclusive span {first}..={last} is reversed");
        Self {
            start: first,
            len: last + 1 - first,
        }
    }

    /// Smallest span covering both `self` and `other`. Empty spans are ignored.
    pub fn cover(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other,
            (_, true) => self,
            _ => {
                let start = self.start.min(other.start);
                let end = self.end().max(other.end());
                Self::new(start, end - start)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive end index.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Index of the last token, or `None` for an empty span.
    pub fn last(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end() - 1)
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// `true` when the span addresses only indices below `len`.
    pub fn fits(&self, len: usize) -> bool {
        self.is_empty() || self.end() <= len
    }
}
