//! Body matching logic.
//!
//! # Responsibilities
//! - Decode the buffered request body into text
//! - Test a trigger substring against that text
//!
//! # Design Decisions
//! - Decoding never fails: a leading UTF-8 BOM is stripped and invalid
//!   sequences become U+FFFD, so garbage bodies simply match nothing
//! - Matching is a case-sensitive substring search, no regex and no parsing
//!   of the body's structure

use std::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode a request body for matching.
///
/// Borrows when the body is valid UTF-8, allocates only to replace invalid
/// sequences.
pub fn decode_body(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}

/// Matches bodies that contain a literal trigger substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringMatcher {
    trigger: String,
}

impl SubstringMatcher {
    /// Create a new substring matcher.
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }

    /// The literal this matcher looks for.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Returns true if `body` contains the trigger anywhere.
    pub fn matches(&self, body: &str) -> bool {
        body.contains(self.trigger.as_str())
    }
}
