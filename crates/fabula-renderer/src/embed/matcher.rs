//! Fuzzy re-anchoring of agentic image excerpts.
//!
//! An agentic image records the verbatim narrative excerpt it illustrates.
//! By the time we render, that text may have drifted: streaming re-chunks
//! whitespace, re-translation swaps a newline for a space, light edits touch
//! spacing around the excerpt. The match rule tolerates exactly that class of
//! drift: whitespace runs are interchangeable, everything else (word sequence,
//! casing, punctuation) must match byte for byte.

use fabula_common::{EmbeddedImage, GenerationMode, ImageStatus};
use regex::Regex;

/// Minimum excerpt length for an image to be eligible for fuzzy matching.
/// Shorter excerpts are too ambiguous to claim a span of narrative.
pub const MIN_SOURCE_CHARS: usize = 20;

/// Build the match pattern for one recorded excerpt.
///
/// Every regex-significant character is escaped; each whitespace run becomes
/// `\s+`. The regex is constructed fresh per call and its `find_iter` gives a
/// lazy, restartable sequence of left-to-right non-overlapping matches; no
/// matcher state is ever shared between calls or images.
///
/// Returns `None` (with a warning) if the pattern fails to compile, which the
/// escaping should make impossible; the image then simply surfaces as an
/// orphan.
pub fn fuzzy_source_regex(source_text: &str) -> Option<Regex> {
    let mut pattern = String::with_capacity(source_text.len() + 16);
    let mut chars = source_text.chars().peekable();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            pattern.push_str(r"\s+");
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(%err, "fuzzy source pattern failed to compile");
            None
        }
    }
}

/// Whether an image may claim a fuzzy marker in the narrative at all.
///
/// Inline images are anchored by their directive, not by excerpt matching,
/// and failed images are surfaced through the orphan gallery rather than as
/// in-text markers.
pub fn displayable_as_marker(image: &EmbeddedImage) -> bool {
    image.generation_mode != GenerationMode::Inline
        && matches!(
            image.status,
            ImageStatus::Pending | ImageStatus::Generating | ImageStatus::Complete
        )
        && image.source_text.chars().count() >= MIN_SOURCE_CHARS
}
