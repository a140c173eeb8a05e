//! Utilities shared by Hoist tests.
//!
//! Selection fixtures mark the selected text inline:
//!
//! ```text
//! int f(int a) { return /*start*/a + 1/*end*/; }
//! ```

use hoist_syntax::{TextRange, TextSize};

const START_MARKER: &str = "/*start*/";
const END_MARKER: &str = "/*end*/";

/// Strips the `/*start*/` and `/*end*/` markers from `fixture`, returning the clean text and
/// the range they delimited in it.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let start = fixture
        .find(START_MARKER)
        .expect("fixture missing /*start*/ marker");
    let after_start = start + START_MARKER.len();
    let end = fixture
        .find(END_MARKER)
        .expect("fixture missing /*end*/ marker");
    assert!(end >= after_start, "/*end*/ must come after /*start*/");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + END_MARKER.len()..]);

    // The end moves left by the length of the start marker.
    let range = TextRange::new(offset(start), offset(end - START_MARKER.len()));
    (text, range)
}

fn offset(value: usize) -> TextSize {
    TextSize::try_from(value).expect("fixture larger than 4GiB")
}
