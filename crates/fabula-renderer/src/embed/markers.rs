//! Resolution of fuzzy matches into a non-overlapping marker set.
//!
//! Several images can record excerpts that land on overlapping spans; a short
//! excerpt is often a substring of a longer, more specific one. Images are
//! therefore processed longest-excerpt-first so the more specific claim wins
//! territory, and any candidate intersecting an accepted marker is rejected.

use fabula_common::{EmbeddedImage, ImageStatus};
use smol_str::SmolStr;

use super::matcher::{displayable_as_marker, fuzzy_source_regex};

/// One accepted fuzzy match, addressed by byte range into the text it was
/// resolved against. Transient: recomputed on every render, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Marker {
    pub start: usize,
    pub end: usize,
    pub image_id: SmolStr,
    pub status: ImageStatus,
}

impl Marker {
    fn intersects(&self, start: usize, end: usize) -> bool {
        start < self.end && end > self.start
    }
}

/// Find and order all fuzzy markers for `content`.
///
/// Output is sorted by descending `start` so callers can splice replacements
/// right-to-left without invalidating the remaining offsets.
pub(crate) fn resolve_markers(content: &str, images: &[EmbeddedImage]) -> Vec<Marker> {
    let mut eligible: Vec<&EmbeddedImage> =
        images.iter().filter(|img| displayable_as_marker(img)).collect();
    // Longer excerpts claim territory first.
    eligible.sort_by(|a, b| b.source_text.len().cmp(&a.source_text.len()));

    let mut markers: Vec<Marker> = Vec::new();

    for img in eligible {
        let Some(re) = fuzzy_source_regex(&img.source_text) else {
            continue;
        };

        for m in re.find_iter(content) {
            let (start, end) = (m.start(), m.end());
            if markers.iter().any(|prev| prev.intersects(start, end)) {
                continue;
            }
            markers.push(Marker {
                start,
                end,
                image_id: img.id.clone(),
                status: img.status,
            });
        }
    }

    tracing::trace!(count = markers.len(), "resolved fuzzy markers");

    markers.sort_by(|a, b| b.start.cmp(&a.start));
    markers
}
