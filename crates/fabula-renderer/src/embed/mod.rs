//! Embedded-image placement pipeline.
//!
//! Reconciles asynchronously generated images with continuously edited or
//! streamed narrative text, in four stages around one call to the external
//! markdown/sanitizer transform:
//!
//! 1. Stage A: extract `<pic>` directives, swap each for an opaque token.
//! 2. Stage B: resolve fuzzy excerpt markers against the Stage-A text, swap
//!    each accepted span for a token.
//! 3. Stage C: run the external render function once on the token-bearing
//!    text. Tokens are plain ASCII alphanumerics, so markdown and sanitizers
//!    pass them through untouched.
//! 4. Stage D: literal-replace every token with its final HTML fragment.
//!
//! The whole pipeline is a pure function of its inputs: no shared state, no
//! I/O, byte-identical output for identical inputs. Image records are only
//! ever read as snapshots; their lifecycle lives elsewhere.

use std::collections::{HashMap, HashSet};

use fabula_common::{EmbeddedImage, GenerationMode};
use smol_str::SmolStr;

mod fragment;
pub mod matcher;
mod markers;
pub mod pic_tag;
pub mod placement;
pub mod streaming;

use markers::resolve_markers;
use pic_tag::extract_pic_tags;

/// Affixes for placeholder tokens. Alphanumeric so no markdown flavor or
/// sanitizer will split, escape, or strip them; the embedded sequence number
/// keeps every token unique within one render call.
const TAG_TOKEN_AFFIX: &str = "IMGTAG";
const MARKER_TOKEN_AFFIX: &str = "IMGREF";

/// Render an entry's narrative content to HTML with all embedded images
/// resolved, shielding `render` from marker syntax via a two-phase token swap.
///
/// `render` is the external text-to-HTML transform (markdown parser or
/// sanitizer) and is invoked exactly once. `regenerating` only affects the
/// presentation of otherwise-complete images.
///
/// Directive lookup is by exact original tag text: if two distinct images
/// were somehow recorded against textually identical directives, they
/// collapse onto one record. A directive with no matching image record
/// renders as nothing rather than leaking raw syntax.
pub fn render_entry_content<F>(
    content: &str,
    images: &[EmbeddedImage],
    regenerating: &HashSet<SmolStr>,
    render: F,
) -> String
where
    F: Fn(&str) -> String,
{
    // Nothing to place: hand the text straight through.
    if images.is_empty() && !content.contains("<pic") {
        return render(content);
    }

    let mut swaps: Vec<(String, String)> = Vec::new();

    // Stage A: directive occurrences become sequential tokens. Built
    // right-to-left so earlier byte offsets stay valid while splicing.
    let inline_by_tag: HashMap<&str, &EmbeddedImage> = images
        .iter()
        .filter(|img| img.generation_mode == GenerationMode::Inline)
        .map(|img| (img.source_text.as_str(), img))
        .collect();

    let mut text = content.to_string();
    let tags = extract_pic_tags(content);
    for (seq, tag) in tags.iter().enumerate().rev() {
        let token = format!("{TAG_TOKEN_AFFIX}{seq}{TAG_TOKEN_AFFIX}");
        let html = match inline_by_tag.get(tag.original_tag.as_str()) {
            Some(img) => fragment::pic_tag_fragment(
                img,
                &tag.prompt,
                regenerating.contains(&img.id),
            ),
            // No record for this directive: drop it silently.
            None => String::new(),
        };
        text.replace_range(tag.start..tag.end, &token);
        swaps.push((token, html));
    }

    // Stage B: fuzzy markers against the Stage-A text, never the original,
    // so directive matching and excerpt matching cannot interfere. Markers
    // arrive sorted by descending start for the same splicing reason.
    let resolved = resolve_markers(&text, images);
    for (seq, marker) in resolved.iter().enumerate() {
        let sanitized: String = marker
            .image_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let token = format!("{MARKER_TOKEN_AFFIX}{sanitized}N{seq}{MARKER_TOKEN_AFFIX}");

        let matched_text = &text[marker.start..marker.end];
        let class = fragment::marker_status_class(
            marker.status,
            regenerating.contains(&marker.image_id),
        );
        let html = fragment::marker_span(&marker.image_id, class, matched_text);

        text.replace_range(marker.start..marker.end, &token);
        swaps.push((token, html));
    }

    tracing::debug!(
        tags = tags.len(),
        markers = resolved.len(),
        "substituted placeholders for render"
    );

    // Stage C: the external transform sees only clean text plus inert tokens.
    let mut html = render(&text);

    // Stage D: restore fragments. Tokens are unique and non-overlapping by
    // construction, so replacement order does not matter.
    for (token, replacement) in &swaps {
        html = html.replace(token, replacement);
    }

    html
}
