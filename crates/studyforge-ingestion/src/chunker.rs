//! Paragraph chunker for extracted curriculum text.
//!
//! Splits on blank-line boundaries and drops short fragments that would
//! only add noise to the vector index (page numbers, stray headings).
//! Pure and lazy: no allocation per call beyond the iterator adapter,
//! identical output on every invocation over the same input.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A blank line: newline, optional whitespace, newline.
    static ref BLANK_LINE: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Segments at or under this many bytes are discarded.
pub const MIN_CHUNK_CHARS: usize = 50;

/// Split `text` into trimmed, non-trivial paragraphs.
///
/// No upper bound is enforced: a paragraph longer than the embedding
/// model's input limit passes through unchanged and fails at the
/// embedding stage instead.
pub fn chunk_text(text: &str, min_chars: usize) -> impl Iterator<Item = &str> {
    BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(move |p| p.len() > min_chars)
}
