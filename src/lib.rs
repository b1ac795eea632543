pub mod bytes;
pub mod core;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod lookahead;
pub mod scan;
pub mod zipped;

#[cfg(feature = "python")]
pub mod python_bindings;

// Re-export the public API
pub use bytes::ByteScan;
pub use crate::core::{count_pairs, CountError, Counter};
pub use driver::{
    ComparisonReport, Driver, MeasureConfig, ResultMismatch, RunConfig, Stats, VariantError,
    VariantReport,
};
pub use error::ConfigError;
pub use fixture::{Alphabet, InputConfig};
pub use lookahead::Lookahead;
pub use scan::CharScan;
pub use zipped::ZipPairs;

/// Count positions where a char is immediately followed by the same char.
///
/// Overlapping pairs count independently: `"aaa"` has two.
///
/// ```
/// assert_eq!(doublecount::count_doubles("aabbaa"), 3);
/// assert_eq!(doublecount::count_doubles(""), 0);
/// ```
pub fn count_doubles(input: &str) -> usize {
    CharScan.count_str(input)
}

/// Every built-in variant, in report order.
pub fn all_counters() -> Result<Vec<Box<dyn Counter>>, CountError> {
    Ok(vec![
        Box::new(CharScan),
        Box::new(ZipPairs),
        Box::new(ByteScan),
        Box::new(Lookahead::new()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_fixtures() {
        let cases = [("", 0), ("a", 0), ("aaa", 2), ("aabb", 2), ("abcabc", 0), ("aabbaa", 3)];
        for c in all_counters().unwrap() {
            for (input, expected) in cases {
                assert_eq!(c.count(input), Ok(expected), "variant={} input={input:?}", c.name());
            }
        }
    }

    #[test]
    fn count_doubles_is_idempotent() {
        let s = fixture::generate(3, 10_000, &Alphabet::ascii_lowercase());
        assert_eq!(count_doubles(&s), count_doubles(&s));
    }

    #[test]
    fn variant_names_are_unique() {
        let names: Vec<_> = all_counters().unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["scan", "zip", "bytes", "lookahead"]);
    }
}
