use crate::core::{CountError, Counter};

/// Canonical implementation: a single left-to-right pass over the chars,
/// comparing each one with its predecessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharScan;

impl CharScan {
    pub fn new() -> CharScan {
        CharScan
    }

    /// Infallible form of [`Counter::count`].
    pub fn count_str(&self, input: &str) -> usize {
        let mut chars = input.chars();
        let Some(mut prev) = chars.next() else {
            return 0;
        };

        let mut total = 0usize;
        for c in chars {
            if c == prev {
                total += 1;
            }
            prev = c;
        }
        total
    }
}

impl Counter for CharScan {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn count(&self, input: &str) -> Result<usize, CountError> {
        Ok(self.count_str(input))
    }
}
