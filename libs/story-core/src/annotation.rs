//! Annotation parser for story content strings.
//!
//! # Format
//! ```text
//! The cat is black <El gato es negro>
//! ```
//!
//! A content string may end with a single bracketed secondary segment,
//! usually the translation. Everything before the first `<` is the primary
//! text; everything between that `<` and the closing `>` at the very end of
//! the string is the secondary text. Strings that do not end in `>`, or that
//! span several lines, carry no secondary text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A content string split into its primary text and optional secondary text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotated {
    pub primary: String,
    pub secondary: String,
}

impl Annotated {
    /// Primary text only, no secondary segment.
    pub fn plain(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: String::new(),
        }
    }

    pub fn has_secondary(&self) -> bool {
        !self.secondary.is_empty()
    }
}

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.primary)
    }
}

/// Parse a content string into primary and secondary text.
///
/// Never fails: malformed brackets fall through to "whole string as
/// primary, empty secondary".
pub fn parse_annotation(s: &str) -> Annotated {
    match split_suffix(s) {
        Some((primary, secondary)) => Annotated {
            primary: primary.trim().to_string(),
            secondary: secondary.trim().to_string(),
        },
        None => Annotated::plain(s.trim()),
    }
}

fn split_suffix(s: &str) -> Option<(&str, &str)> {
    if s.chars().any(is_line_break) {
        return None;
    }

    let body = s.strip_suffix('>')?;
    let open = body.find('<')?;
    Some((&body[..open], &body[open + 1..]))
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
