use thiserror::Error;

/// Errors a counter can report. The scan-based counters never produce one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    /// The pattern could not be compiled.
    #[error("regex compile error: {0}")]
    Regex(String),
    /// The regex engine gave up while searching (backtrack limit and similar).
    #[error("regex search failed: {detail}")]
    Backtrack { detail: String },
}

/// Trait describing one implementation of the adjacent-pair count.
///
/// Every implementation must return, for any input, the number of positions
/// `i` where the char at `i` equals the char at `i + 1`. Overlapping pairs
/// count independently, so `"aaa"` yields 2.
pub trait Counter: Send + Sync {
    /// Short stable name used in reports and CLI filters.
    fn name(&self) -> &'static str;

    /// Count adjacent equal chars in `input`.
    fn count(&self, input: &str) -> Result<usize, CountError>;
}

/// Count positions `i` where `items[i] == items[i + 1]`.
///
/// Works over any comparable element type. Empty and single-element slices
/// yield 0.
pub fn count_pairs<T: PartialEq>(items: &[T]) -> usize {
    let mut total = 0usize;
    for i in 1..items.len() {
        if items[i - 1] == items[i] {
            total += 1;
        }
    }
    total
}

/// Brute-force reference: enumerate every index pair explicitly. Only used to
/// check the real counters on small fixtures.
pub fn enumerate_pairs(input: &str) -> Vec<usize> {
    let chars: Vec<char> = input.chars().collect();
    (0..chars.len().saturating_sub(1))
        .filter(|&i| chars[i] == chars[i + 1])
        .collect()
}
