//! fabula-renderer
//!
//! Embedded-image placement and rendering pipeline for fabula entries. Takes
//! a narrative text, a snapshot of the entry's image records, and an external
//! text-to-HTML transform, and produces HTML in which every image anchor
//! (explicit `<pic>` directive or fuzzily re-located excerpt) is replaced by
//! a self-describing fragment, without the transform ever seeing marker
//! syntax.

pub mod embed;

pub use embed::render_entry_content;
pub use embed::matcher::{MIN_SOURCE_CHARS, displayable_as_marker, fuzzy_source_regex};
pub use embed::pic_tag::{
    MIN_PROMPT_CHARS, PicTag, contains_pic_tag, count_pic_tags, extract_pic_tags, strip_pic_tags,
};
pub use embed::placement::placed_image_ids;
pub use embed::streaming::{has_incomplete_pic_tag, replace_tags_with_loading, safe_stream_boundary};
