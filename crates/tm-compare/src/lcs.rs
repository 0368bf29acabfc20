//! Longest-common-subsequence DP shared by the word, sentence and chunk diffs.
//!
//! The match predicate is supplied by the caller: case-insensitive equality
//! for tokens and chunks, a Jaccard threshold for sentences. The backtrack
//! re-evaluates the same predicate at every step and, when the cells are not
//! a match, steps toward the larger neighbour, preferring to consume the
//! left element when `dp[i-1][j] >= dp[i][j-1]`. Downstream highlight
//! patterns depend on that tie-break, so it must stay exactly as is.

use tm_core::{HighlightMask, TokenSequence};

// ---------------------------------------------------------------------------
// LcsTable
// ---------------------------------------------------------------------------

/// `(m + 1) × (n + 1)` table where cell `(i, j)` holds the LCS length of the
/// first `i` left and first `j` right elements.
#[derive(Debug, Clone)]
pub struct LcsTable {
    rows: usize,
    cols: usize,
    cells: Vec<usize>,
}

impl LcsTable {
    /// Fill the table for sequences of length `m` and `n`.
    pub fn build<F>(m: usize, n: usize, matches: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        let rows = m + 1;
        let cols = n + 1;
        let mut cells = vec![0usize; rows * cols];
        for i in 1..rows {
            for j in 1..cols {
                cells[i * cols + j] = if matches(i - 1, j - 1) {
                    cells[(i - 1) * cols + (j - 1)] + 1
                } else {
                    cells[(i - 1) * cols + j].max(cells[i * cols + (j - 1)])
                };
            }
        }
        Self { rows, cols, cells }
    }

    pub fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    /// Length of the longest common subsequence.
    pub fn length(&self) -> usize {
        self.get(self.rows - 1, self.cols - 1)
    }

    /// Walk back from the bottom-right cell and return the matched index
    /// pairs in ascending order.
    pub fn backtrack<F>(&self, matches: F) -> Vec<(usize, usize)>
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut pairs = Vec::with_capacity(self.length());
        let mut i = self.rows - 1;
        let mut j = self.cols - 1;
        while i > 0 && j > 0 {
            if matches(i - 1, j - 1) {
                pairs.push((i - 1, j - 1));
                i -= 1;
                j -= 1;
            } else if self.get(i - 1, j) >= self.get(i, j - 1) {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        pairs.reverse();
        pairs
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Matched index pairs of the LCS between sequences of length `m` and `n`.
pub fn lcs_pairs<F>(m: usize, n: usize, matches: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    LcsTable::build(m, n, &matches).backtrack(&matches)
}

/// Highlight every element that the backtrack did not pair up.
pub fn lcs_highlights<F>(m: usize, n: usize, matches: F) -> (HighlightMask, HighlightMask)
where
    F: Fn(usize, usize) -> bool,
{
    let mut left = HighlightMask::from_bits(vec![true; m]);
    let mut right = HighlightMask::from_bits(vec![true; n]);
    for (i, j) in lcs_pairs(m, n, matches) {
        left.clear(i);
        right.clear(j);
    }
    (left, right)
}

/// Exact word-level diff over two token sequences, whitespace tokens
/// included, with case-insensitive equality.
pub fn word_lcs(left: &TokenSequence, right: &TokenSequence) -> (HighlightMask, HighlightMask) {
    let left_norm: Vec<String> = left.iter().map(|t| t.normalized()).collect();
    let right_norm: Vec<String> = right.iter().map(|t| t.normalized()).collect();
    lcs_highlights(left_norm.len(), right_norm.len(), |i, j| {
        left_norm[i] == right_norm[j]
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize_structural;

    fn chars_eq<'a>(a: &'a [char], b: &'a [char]) -> impl Fn(usize, usize) -> bool + 'a {
        move |i, j| a[i] == b[j]
    }

    #[test]
    fn table_length_of_classic_example() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        let table = LcsTable::build(a.len(), b.len(), chars_eq(&a, &b));
        assert_eq!(table.length(), 4);
    }

    #[test]
    fn backtrack_prefers_consuming_left_on_tie() {
        // "ab" vs "ba": both "a" and "b" are LCS of length 1. With the left
        // bias the walk drops left "b" first and keeps the "a" match.
        let a = ['a', 'b'];
        let b = ['b', 'a'];
        let pairs = lcs_pairs(2, 2, chars_eq(&a, &b));
        assert_eq!(pairs, vec![(0, 1)]);
        let (l, r) = lcs_highlights(2, 2, chars_eq(&a, &b));
        assert_eq!(l.as_slice(), &[false, true]);
        assert_eq!(r.as_slice(), &[true, false]);
    }

    #[test]
    fn pairs_are_ascending() {
        let a: Vec<char> = "xaybzc".chars().collect();
        let b: Vec<char> = "abc".chars().collect();
        assert_eq!(lcs_pairs(a.len(), b.len(), chars_eq(&a, &b)), vec![(1, 0), (3, 1), (5, 2)]);
    }

    #[test]
    fn empty_side_highlights_everything_else() {
        let a = ['a', 'b'];
        let b: [char; 0] = [];
        let (l, r) = lcs_highlights(2, 0, chars_eq(&a, &b));
        assert_eq!(l.count(), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn word_lcs_identical_text_has_no_highlights() {
        let seq = tokenize_structural("The quick brown fox.");
        let (l, r) = word_lcs(&seq, &seq);
        assert_eq!(l.count(), 0);
        assert_eq!(r.count(), 0);
    }

    #[test]
    fn word_lcs_is_case_insensitive() {
        let left = tokenize_structural("Hello World");
        let right = tokenize_structural("hello world");
        let (l, r) = word_lcs(&left, &right);
        assert_eq!(l.count() + r.count(), 0);
    }

    #[test]
    fn word_lcs_marks_substitution() {
        let left = tokenize_structural("the red car");
        let right = tokenize_structural("the blue car");
        let (l, r) = word_lcs(&left, &right);
        assert_eq!(l.highlighted_indices(), vec![2]);
        assert_eq!(r.highlighted_indices(), vec![2]);
    }
}
