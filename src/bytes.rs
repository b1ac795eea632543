// ByteScan: the "native" fast path.
//
// For ASCII input every char is exactly one byte, so comparing adjacent bytes
// is the same as comparing adjacent chars and the compiler can vectorise the
// `windows(2)` loop. UTF-8 continuation bytes can repeat inside a single char
// (U+1041 is e1 81 81), so anything non-ASCII goes through the char scan.
use crate::core::{CountError, Counter};
use crate::scan::CharScan;

#[derive(Debug, Clone, Copy, Default)]
pub struct ByteScan;

impl ByteScan {
    /// Count on raw bytes. Only meaningful when every element is one char.
    pub fn count_ascii(bytes: &[u8]) -> usize {
        bytes.windows(2).filter(|w| w[0] == w[1]).count()
    }
}

impl Counter for ByteScan {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn count(&self, input: &str) -> Result<usize, CountError> {
        let bytes = input.as_bytes();
        if bytes.is_ascii() {
            Ok(Self::count_ascii(bytes))
        } else {
            Ok(CharScan.count_str(input))
        }
    }
}
