//! HTML fragments for embedded images.
//!
//! Fragments are assembled with [`Fragment`], which only accepts unescaped
//! markup as `&'static str` chrome; every runtime value (prompt text, error
//! messages, image payloads) has to pass through an escaping method. That
//! makes injection safety a property of the builder rather than a per-call
//! discipline.
//!
//! The markup inventory (placeholder card, shimmer, spinner, retry button,
//! completed image with view affordance) is what the UI layer's stylesheet
//! and click handlers are written against; fragments self-describe through
//! `data-image-id`, `data-prompt` and `data-action` attributes.

use fabula_common::{EmbeddedImage, ImageStatus};

/// Prompts longer than this are truncated for placeholder previews.
const PROMPT_PREVIEW_CHARS: usize = 60;

/// Append-only HTML accumulator.
///
/// `markup` takes `&'static str` so arbitrary runtime strings cannot reach
/// the output unescaped; `attr_value`, `text`, and `verbatim` are the only
/// ways in for dynamic data, and all but the deliberately-named `verbatim`
/// escape their input.
pub(crate) struct Fragment {
    html: String,
}

impl Fragment {
    pub fn new() -> Self {
        Self {
            html: String::new(),
        }
    }

    /// Static, trusted chrome: tags, class lists, SVG paths.
    pub fn markup(mut self, chrome: &'static str) -> Self {
        self.html.push_str(chrome);
        self
    }

    /// Escaped attribute value. The caller supplies the surrounding
    /// `name="` ... `"` via `markup`.
    pub fn attr_value(mut self, value: &str) -> Self {
        escape_into(&mut self.html, value);
        self
    }

    /// Escaped body text.
    pub fn text(mut self, value: &str) -> Self {
        escape_into(&mut self.html, value);
        self
    }

    /// Unescaped passthrough for narrative text that was already present in
    /// the rendered content and for pre-built child fragments. Named so the
    /// exception is visible at every call site.
    pub fn verbatim(mut self, value: &str) -> Self {
        self.html.push_str(value);
        self
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

const SPINNER_SVG: &str = r#"<svg class="placeholder-spinner-svg" viewBox="0 0 50 50"><circle cx="25" cy="25" r="20" fill="none" stroke="currentColor" stroke-width="3" stroke-linecap="round" stroke-dasharray="80, 200" stroke-dashoffset="0"></circle></svg>"#;

const SPINNER_SVG_PENDING: &str = r#"<svg class="placeholder-spinner-svg pending" viewBox="0 0 50 50"><circle cx="25" cy="25" r="20" fill="none" stroke="currentColor" stroke-width="3" stroke-linecap="round" stroke-dasharray="80, 200" stroke-dashoffset="0"></circle></svg>"#;

const IMAGE_ICON_SVG: &str = r#"<svg class="placeholder-image-icon" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round"><rect width="18" height="18" x="3" y="3" rx="2" ry="2"/><circle cx="9" cy="9" r="2"/><path d="m21 15-3.086-3.086a2 2 0 0 0-2.828 0L6 21"/></svg>"#;

const ERROR_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><circle cx="12" cy="12" r="10"/><line x1="12" x2="12" y1="8" y2="12"/><line x1="12" x2="12.01" y1="16" y2="16"/></svg>"#;

const RETRY_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M21 12a9 9 0 1 1-9-9c2.52 0 4.93 1 6.74 2.74L21 8"/><path d="M21 3v5h-5"/></svg>"#;

fn prompt_preview(prompt: &str) -> String {
    if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
        let mut preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    } else {
        prompt.to_string()
    }
}

/// Select the fragment for one `<pic>` directive occurrence.
///
/// `regenerating` only changes presentation for otherwise-complete images.
/// A `Complete` record missing its payload (inconsistent snapshot) falls back
/// to the queued presentation rather than emitting a broken `<img>`.
pub(crate) fn pic_tag_fragment(image: &EmbeddedImage, prompt: &str, regenerating: bool) -> String {
    match image.status {
        ImageStatus::Complete => match image.image_data.as_deref() {
            Some(data) if regenerating => regenerating_image(&image.id, prompt, data),
            Some(data) => complete_image(&image.id, prompt, data),
            None => queued_placeholder(&image.id, prompt),
        },
        ImageStatus::Generating => generating_placeholder(&image.id, prompt),
        ImageStatus::Failed => failed_placeholder(
            &image.id,
            prompt,
            image.error_message.as_deref().unwrap_or("Generation failed"),
        ),
        ImageStatus::Pending => queued_placeholder(&image.id, prompt),
    }
}

/// Status class for a fuzzy marker's inline wrapper.
///
/// Failed images are never eligible for markers; if one slips through an
/// inconsistent snapshot it gets the queued styling.
pub(crate) fn marker_status_class(status: ImageStatus, regenerating: bool) -> &'static str {
    if regenerating {
        return "regenerating";
    }
    match status {
        ImageStatus::Complete => "complete",
        ImageStatus::Generating => "generating",
        ImageStatus::Pending | ImageStatus::Failed => "pending",
    }
}

/// Inline wrapper for a fuzzy marker: the matched narrative text, annotated
/// but not altered.
pub(crate) fn marker_span(image_id: &str, status_class: &'static str, matched_text: &str) -> String {
    Fragment::new()
        .markup(r#"<span class="embedded-image-link "#)
        .markup(status_class)
        .markup(r#"" data-image-id=""#)
        .attr_value(image_id)
        .markup(r#"">"#)
        .verbatim(matched_text)
        .markup("</span>")
        .into_html()
}

/// Completed image, clickable to open the viewer.
pub(crate) fn complete_image(image_id: &str, prompt: &str, image_data: &str) -> String {
    Fragment::new()
        .markup(r#"<div class="inline-generated-image" data-image-id=""#)
        .attr_value(image_id)
        .markup(r#"" data-prompt=""#)
        .attr_value(prompt)
        .markup(r#"" data-action="view" role="button" tabindex="0"><img src="data:image/png;base64,"#)
        .attr_value(image_data)
        .markup(r#"" alt=""#)
        .attr_value(prompt)
        .markup(r#"" loading="lazy" /></div>"#)
        .into_html()
}

/// Completed image with a regeneration overlay on top.
pub(crate) fn regenerating_image(image_id: &str, prompt: &str, image_data: &str) -> String {
    Fragment::new()
        .markup(r#"<div class="inline-generated-image regenerating" data-image-id=""#)
        .attr_value(image_id)
        .markup(r#"" data-prompt=""#)
        .attr_value(prompt)
        .markup(r#""><img src="data:image/png;base64,"#)
        .attr_value(image_data)
        .markup(r#"" alt=""#)
        .attr_value(prompt)
        .markup(r#"" loading="lazy" class="regenerating-image" /><div class="regenerating-overlay"><div class="regenerating-content">"#)
        .markup(SPINNER_SVG)
        .markup(r#"<span class="regenerating-text">Regenerating...</span></div></div></div>"#)
        .into_html()
}

/// Shimmering loader shown while generation is in flight.
pub(crate) fn generating_placeholder(image_id: &str, prompt: &str) -> String {
    placeholder_card(
        "generating",
        image_id,
        prompt,
        loader_content("Generating image...", prompt, SPINNER_SVG),
    )
}

/// Queued-state loader for images waiting their turn.
pub(crate) fn queued_placeholder(image_id: &str, prompt: &str) -> String {
    placeholder_card(
        "pending",
        image_id,
        prompt,
        loader_content("In queue...", prompt, SPINNER_SVG_PENDING),
    )
}

/// Error card with the escaped failure message and a retry affordance keyed
/// to the image id.
pub(crate) fn failed_placeholder(image_id: &str, prompt: &str, error_message: &str) -> String {
    let inner = Fragment::new()
        .markup(r#"<div class="placeholder-error-icon">"#)
        .markup(ERROR_ICON_SVG)
        .markup(r#"</div><div class="placeholder-info"><span class="placeholder-status error">"#)
        .text(error_message)
        .markup(r#"</span><span class="placeholder-prompt">"#)
        .text(&prompt_preview(prompt))
        .markup(r#"</span></div><button class="inline-image-btn retry-btn" data-action="regenerate" data-image-id=""#)
        .attr_value(image_id)
        .markup(r#"" title="Retry generation">"#)
        .markup(RETRY_ICON_SVG)
        .markup(" Retry</button>")
        .into_html();
    placeholder_card("failed", image_id, prompt, inner)
}

fn loader_content(status_text: &'static str, prompt: &str, spinner: &'static str) -> String {
    Fragment::new()
        .markup(r#"<div class="placeholder-loader">"#)
        .markup(spinner)
        .markup(IMAGE_ICON_SVG)
        .markup(r#"</div><div class="placeholder-info"><span class="placeholder-status">"#)
        .markup(status_text)
        .markup(r#"</span><span class="placeholder-prompt">"#)
        .text(&prompt_preview(prompt))
        .markup("</span></div>")
        .into_html()
}

fn placeholder_card(
    status_class: &'static str,
    image_id: &str,
    prompt: &str,
    inner: String,
) -> String {
    let shimmer = if status_class == "failed" {
        ""
    } else {
        r#"<div class="placeholder-shimmer"></div>"#
    };
    Fragment::new()
        .markup(r#"<div class="inline-image-placeholder "#)
        .markup(status_class)
        .markup(r#"" data-image-id=""#)
        .attr_value(image_id)
        .markup(r#"" data-prompt=""#)
        .attr_value(prompt)
        .markup(r#"">"#)
        .markup(shimmer)
        .markup(r#"<div class="placeholder-content">"#)
        .verbatim(&inner)
        .markup("</div></div>")
        .into_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_and_error_are_escaped() {
        let html = failed_placeholder("img-1", r#"a "quoted" <prompt>"#, "boom <script>");
        assert!(html.contains("boom &lt;script&gt;"));
        assert!(html.contains("a &quot;quoted&quot; &lt;prompt&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-action="regenerate""#));
        assert!(html.contains(r#"data-image-id="img-1""#));
    }

    #[test]
    fn complete_image_carries_interaction_attributes() {
        let html = complete_image("img-9", "Moonlight over the harbor", "aGVsbG8=");
        assert!(html.contains(r#"data-image-id="img-9""#));
        assert!(html.contains(r#"data-action="view""#));
        assert!(html.contains("data:image/png;base64,aGVsbG8="));
        assert!(html.contains(r#"alt="Moonlight over the harbor""#));
    }

    #[test]
    fn long_prompt_is_truncated_in_preview() {
        let prompt = "x".repeat(80);
        assert_eq!(prompt_preview(&prompt), format!("{}...", "x".repeat(60)));
        assert_eq!(prompt_preview("short prompt"), "short prompt");
        // The full prompt still rides along in data-prompt.
        let html = generating_placeholder("img-2", &prompt);
        assert!(html.contains(&format!(r#"data-prompt="{prompt}""#)));
    }

    #[test]
    fn marker_span_preserves_matched_text() {
        let html = marker_span("img-3", "complete", "she walked *on*");
        assert_eq!(
            html,
            r#"<span class="embedded-image-link complete" data-image-id="img-3">she walked *on*</span>"#
        );
    }

    #[test]
    fn regenerating_overrides_status_class() {
        assert_eq!(marker_status_class(ImageStatus::Complete, true), "regenerating");
        assert_eq!(marker_status_class(ImageStatus::Complete, false), "complete");
        assert_eq!(marker_status_class(ImageStatus::Generating, false), "generating");
        assert_eq!(marker_status_class(ImageStatus::Pending, false), "pending");
    }

    #[test]
    fn shimmer_omitted_for_failures() {
        let failed = failed_placeholder("img-4", "A quiet street at dawn", "timeout");
        assert!(!failed.contains("placeholder-shimmer"));
        let pending = queued_placeholder("img-4", "A quiet street at dawn");
        assert!(pending.contains("placeholder-shimmer"));
    }
}
