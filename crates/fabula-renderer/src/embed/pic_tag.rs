//! Extraction of `<pic>` directives from narrative content.
//!
//! A directive is the explicit, inline-authored form of an image anchor:
//!
//! ```text
//! <pic prompt="A hooded figure enters the tavern" characters="Mira,Joss" />
//! ```
//!
//! Both the self-closing form and the paired `<pic ...></pic>` form are
//! accepted; nothing between paired tags is significant. A directive only
//! counts as well-formed if it carries a `prompt` attribute of at least
//! [`MIN_PROMPT_CHARS`] characters. Anything else passes through to the
//! renderer as literal text, never partially extracted.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum prompt length for a directive to be extracted.
///
/// Independent of the 20-character minimum that gates fuzzy marker
/// eligibility; the two thresholds are tuned separately.
pub const MIN_PROMPT_CHARS: usize = 10;

pub(crate) static PIC_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<pic\s+([^>]*?)(?:/>|>\s*</pic>)").unwrap());

static PROMPT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)prompt=["']([^"']+)["']"#).unwrap());

static CHARACTERS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)characters=["']([^"']*)["']"#).unwrap());

/// One well-formed `<pic>` directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicTag {
    /// Full original tag text, exactly as it appears in the content. Inline
    /// image records are keyed by this string.
    pub original_tag: String,
    /// Byte offset of the tag's first character.
    pub start: usize,
    /// Byte offset one past the tag's last character.
    pub end: usize,
    /// Image generation prompt.
    pub prompt: String,
    /// Character names for portrait reference; empty entries already dropped.
    pub characters: Vec<String>,
}

/// Extract every well-formed `<pic>` directive in `content`, in text order.
///
/// Repeated occurrences of textually identical tags each yield their own
/// entry. Directives with a missing or undersized `prompt` are skipped
/// entirely.
pub fn extract_pic_tags(content: &str) -> Vec<PicTag> {
    let mut tags = Vec::new();

    for caps in PIC_TAG_RE.captures_iter(content) {
        let whole = caps.get(0).expect("match always has group 0");
        let attrs = &caps[1];

        let Some(prompt) = PROMPT_ATTR_RE
            .captures(attrs)
            .map(|c| c[1].to_string())
        else {
            continue;
        };
        if prompt.chars().count() < MIN_PROMPT_CHARS {
            continue;
        }

        let characters = CHARACTERS_ATTR_RE
            .captures(attrs)
            .map(|c| {
                c[1].split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        tags.push(PicTag {
            original_tag: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            prompt,
            characters,
        });
    }

    tags
}

/// Pull the prompt back out of an already-extracted tag's original text.
pub(crate) fn tag_prompt(original_tag: &str) -> Option<String> {
    PROMPT_ATTR_RE
        .captures(original_tag)
        .map(|c| c[1].to_string())
}

/// Quick check without full attribute parsing. Matches any syntactically
/// closed `<pic>` tag, valid prompt or not.
pub fn contains_pic_tag(content: &str) -> bool {
    PIC_TAG_RE.is_match(content)
}

/// Number of syntactically closed `<pic>` tags in `content`.
pub fn count_pic_tags(content: &str) -> usize {
    PIC_TAG_RE.find_iter(content).count()
}

/// Remove all `<pic>` tags, leaving just the narrative text. Used for word
/// counts and plain-text exports.
pub fn strip_pic_tags(content: &str) -> String {
    PIC_TAG_RE.replace_all(content, "").into_owned()
}
