//! Safe display of partially-arrived narrative text.
//!
//! While an entry streams in, a `<pic>` directive can arrive split across
//! chunks. Handing a half-open tag to the markdown renderer would leak raw
//! directive syntax to the user, so the streaming display path truncates at
//! [`safe_stream_boundary`] before rendering. The substitution engine itself
//! always assumes complete input and never truncates.

use super::fragment;
use super::pic_tag::{PIC_TAG_RE, tag_prompt};

const PIC_OPEN: &str = "<pic";

/// Byte index up to which `content` is safe to render.
///
/// If the last `<pic` opening has no closer (`/>` or `</pic>`) after it, the
/// text is unsafe from that opening onward and its index is returned;
/// otherwise the full length.
pub fn safe_stream_boundary(content: &str) -> usize {
    let Some(last_open) = content.rfind(PIC_OPEN) else {
        return content.len();
    };

    let after_open = &content[last_open..];
    if after_open.contains("/>") || after_open.contains("</pic>") {
        content.len()
    } else {
        last_open
    }
}

/// Whether the tail of `content` holds an opened-but-unclosed directive.
pub fn has_incomplete_pic_tag(content: &str) -> bool {
    safe_stream_boundary(content) != content.len()
}

/// Swap every complete `<pic>` tag for an id-less generating placeholder.
///
/// Used by the streaming display before any image records exist: the tag is
/// already fully streamed, but generation has not been scheduled yet, so there
/// is no id to key interaction on.
pub fn replace_tags_with_loading(content: &str) -> String {
    PIC_TAG_RE
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let prompt = tag_prompt(&caps[0]).unwrap_or_else(|| "Image".to_string());
            fragment::generating_placeholder("", &prompt)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclosed_tag_bounds_at_opening() {
        let content = r#"The tavern fell quiet. <pic prompt="partial"#;
        assert_eq!(safe_stream_boundary(content), 23);
        assert!(has_incomplete_pic_tag(content));
    }

    #[test]
    fn closed_tag_is_fully_safe() {
        let closed = r#"Quiet night. <pic prompt="A quiet street at dawn" /> More text"#;
        assert_eq!(safe_stream_boundary(closed), closed.len());
        assert!(!has_incomplete_pic_tag(closed));

        let paired = r#"Quiet night. <pic prompt="A quiet street at dawn"></pic>"#;
        assert_eq!(safe_stream_boundary(paired), paired.len());
    }

    #[test]
    fn text_without_tags_is_fully_safe() {
        let content = "Nothing to see here, just prose.";
        assert_eq!(safe_stream_boundary(content), content.len());
    }

    #[test]
    fn only_last_opening_matters() {
        let content = r#"<pic prompt="A quiet street at dawn" /> then <pic prompt="unfin"#;
        assert_eq!(safe_stream_boundary(content), content.rfind("<pic").unwrap());
    }

    #[test]
    fn loading_placeholders_replace_complete_tags() {
        let content = r#"Before <pic prompt="A hooded figure enters the tavern" /> after"#;
        let out = replace_tags_with_loading(content);
        assert!(!out.contains("<pic"));
        assert!(out.contains("inline-image-placeholder generating"));
        assert!(out.contains("A hooded figure enters the tavern"));
        assert!(out.starts_with("Before "));
        assert!(out.ends_with(" after"));
    }
}
