//! Which images are currently placed in an entry's content.
//!
//! An image whose anchor no longer resolves (excerpt drifted too far, or its
//! directive was edited out) is an orphan: still generated, just not visible
//! in the text. The gallery view uses this index to offer orphans back to the
//! author.

use std::collections::HashSet;

use fabula_common::{EmbeddedImage, GenerationMode};
use smol_str::SmolStr;

use super::markers::resolve_markers;
use super::pic_tag::PIC_TAG_RE;

/// Ids of all images currently placed in `content`.
///
/// The union of fuzzy-marker claims (agentic images) and inline images whose
/// exact original tag text appears verbatim. Pure and read-only.
pub fn placed_image_ids(content: &str, images: &[EmbeddedImage]) -> HashSet<SmolStr> {
    if images.is_empty() {
        return HashSet::new();
    }

    let mut placed: HashSet<SmolStr> = resolve_markers(content, images)
        .into_iter()
        .map(|m| m.image_id)
        .collect();

    let inline: Vec<&EmbeddedImage> = images
        .iter()
        .filter(|img| img.generation_mode == GenerationMode::Inline)
        .collect();
    if !inline.is_empty() {
        for m in PIC_TAG_RE.find_iter(content) {
            for img in &inline {
                if img.source_text == m.as_str() {
                    placed.insert(img.id.clone());
                }
            }
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_common::ImageStatus;

    fn image(id: &str, source: &str, mode: GenerationMode) -> EmbeddedImage {
        EmbeddedImage {
            id: SmolStr::new(id),
            source_text: source.to_string(),
            generation_mode: mode,
            status: ImageStatus::Complete,
            image_data: Some(String::new()),
            error_message: None,
            entry_id: SmolStr::new("entry-1"),
        }
    }

    #[test]
    fn reports_only_currently_placed_ids() {
        let tag = r#"<pic prompt="A hooded figure enters the tavern" />"#;
        let content = format!("The bell tolled twice more as she entered. {tag}");

        let images = vec![
            image("fuzzy-placed", "bell tolled twice more as she", GenerationMode::Agentic),
            image("inline-placed", tag, GenerationMode::Inline),
            image("orphan", "an excerpt that drifted away entirely", GenerationMode::Agentic),
        ];

        let placed = placed_image_ids(&content, &images);
        assert_eq!(placed.len(), 2);
        assert!(placed.contains("fuzzy-placed"));
        assert!(placed.contains("inline-placed"));
        assert!(!placed.contains("orphan"));
    }

    #[test]
    fn empty_inputs_place_nothing() {
        assert!(placed_image_ids("some content", &[]).is_empty());
        let images = vec![image("a", "the bell tolled twice more", GenerationMode::Agentic)];
        assert!(placed_image_ids("", &images).is_empty());
    }

    #[test]
    fn edited_directive_orphans_its_inline_image() {
        let recorded = r#"<pic prompt="A hooded figure enters the tavern" />"#;
        let edited = r#"<pic prompt="A hooded figure leaves the tavern" />"#;
        let images = vec![image("inline-a", recorded, GenerationMode::Inline)];
        assert!(placed_image_ids(edited, &images).is_empty());
    }
}
