//! Segmentation — splits a raw document into ordered, non-overlapping
//! `TextUnit`s with byte offsets into the original string.
//!
//! Two modes: sentence (terminal punctuation) for detection, line for the
//! line-substitution rewrite strategy. Offsets use a running search cursor
//! so repeated sentences resolve to successive positions instead of all
//! colliding on the first occurrence.

use serde::{Deserialize, Serialize};

/// A segmented span of the input document with its original-text offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUnit {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Splits on one-or-more sentence-terminal characters (`.`, `!`, `?`) and
/// drops units whose trimmed text is empty.
pub fn segment_sentences(text: &str) -> Vec<TextUnit> {
    segment_by(text, |c| matches!(c, '.' | '!' | '?'))
}

/// Splits on line breaks. `\r\n` is tolerated: the trailing `\r` is trimmed
/// away with the rest of the surrounding whitespace.
pub fn segment_lines(text: &str) -> Vec<TextUnit> {
    segment_by(text, |c| c == '\n')
}

fn segment_by(text: &str, boundary: impl FnMut(char) -> bool) -> Vec<TextUnit> {
    let mut units = Vec::new();
    // Each occurrence search starts after the previous match's end, so
    // duplicate substrings get distinct, ordered offsets.
    let mut cursor = 0;
    for raw in text.split(boundary) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let start = match text[cursor..].find(trimmed) {
            Some(pos) => cursor + pos,
            // Unreachable for substrings of `text`, but don't panic on it.
            None => cursor,
        };
        let end = start + trimmed.len();
        cursor = end;
        units.push(TextUnit {
            text: trimmed.to_string(),
            start,
            end,
        });
    }
    units
}
