use crate::core::{CountError, Counter};

/// Pairs every char with its successor by zipping the char stream with a copy
/// of itself shifted by one, then counts the equal pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPairs;

impl Counter for ZipPairs {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn count(&self, input: &str) -> Result<usize, CountError> {
        let total = input
            .chars()
            .zip(input.chars().skip(1))
            .filter(|(c1, c2)| c1 == c2)
            .count();
        Ok(total)
    }
}
