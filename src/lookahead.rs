use std::sync::OnceLock;

use fancy_regex::{Regex, RegexBuilder};

use crate::core::{CountError, Counter};

/// Zero-width lookahead: matches at every position whose char is immediately
/// followed by the same char. `(?s)` lets `.` match `\n` as well.
pub const DOUBLE_PATTERN: &str = r"(?s)(?=(.)\1)";

/// Counts adjacent pairs by counting lookahead matches.
///
/// Each match is empty, so consecutive matches never consume input and every
/// overlapping pair in a run like `"aaa"` is found.
///
/// The backtrack limit is lifted: the engine counts steps per search, so a
/// long stretch without any pair would otherwise exhaust the default limit.
#[derive(Debug, Clone)]
pub struct Lookahead {
    re: Regex,
}

impl Lookahead {
    pub fn new() -> Result<Lookahead, CountError> {
        Self::with_pattern(DOUBLE_PATTERN)
    }

    /// Build from a custom pattern. The pattern must produce exactly one match
    /// per counted position.
    pub fn with_pattern(pattern: &str) -> Result<Lookahead, CountError> {
        let re = RegexBuilder::new(pattern)
            .backtrack_limit(usize::MAX)
            .build()
            .map_err(|e| CountError::Regex(e.to_string()))?;
        Ok(Lookahead { re })
    }

    /// Process-wide instance of the default pattern, compiled on first use.
    pub fn shared() -> Result<&'static Lookahead, CountError> {
        static SHARED: OnceLock<Result<Lookahead, CountError>> = OnceLock::new();
        SHARED.get_or_init(Lookahead::new).as_ref().map_err(Clone::clone)
    }

    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }
}

impl Counter for Lookahead {
    fn name(&self) -> &'static str {
        "lookahead"
    }

    fn count(&self, input: &str) -> Result<usize, CountError> {
        let mut total = 0usize;
        for m in self.re.find_iter(input) {
            m.map_err(|e| CountError::Backtrack { detail: e.to_string() })?;
            total += 1;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_overlapping_lookahead_matches() {
        let la = Lookahead::new().unwrap();
        assert_eq!(la.count("aaa"), Ok(2));
        assert_eq!(la.count("aabbaa"), Ok(3));
        assert_eq!(la.count("abcabc"), Ok(0));
        assert_eq!(la.count(""), Ok(0));
    }

    #[test]
    fn newlines_and_multibyte_chars_count() {
        let la = Lookahead::new().unwrap();
        assert_eq!(la.count("a\n\nb"), Ok(1));
        assert_eq!(la.count("ééa"), Ok(1));
        assert_eq!(la.count("\u{1041}"), Ok(0));
    }

    #[test]
    fn shared_instance_is_compiled_once() {
        let a = Lookahead::shared().unwrap();
        let b = Lookahead::shared().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.pattern(), DOUBLE_PATTERN);
        assert_eq!(a.count("xxyy"), Ok(2));
    }

    #[test]
    fn long_gap_between_pairs_is_not_a_search_failure() {
        let la = Lookahead::new().unwrap();
        let gap = "ab".repeat(600_000);
        let s = format!("xx{gap}yy{gap}");
        assert_eq!(la.count(&s), Ok(2));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Lookahead::with_pattern("(?=(.)").unwrap_err();
        assert!(matches!(err, CountError::Regex(_)));
    }
}
