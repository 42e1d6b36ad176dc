//! Shared data model for fabula entries and their embedded images.
//!
//! Image records are created and mutated by the generation lifecycle (outside
//! this workspace); the rendering pipeline only ever reads point-in-time
//! snapshots of them, usually deserialized from the host application's
//! persisted entry JSON.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Lifecycle state of an embedded image.
///
/// Closed set: fragment selection in the renderer matches exhaustively on this
/// enum, so adding a status is a compile-time obligation there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Generating,
    Complete,
    Failed,
}

impl ImageStatus {
    /// Parse a persisted status string, falling back to `Pending` for anything
    /// unrecognized so that stale or foreign records still get the queued
    /// presentation instead of failing the load.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "generating" => Self::Generating,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl<'de> Deserialize<'de> for ImageStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = SmolStr::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&s))
    }
}

/// How an image was anchored to the narrative at creation time.
///
/// `Inline` images are authored via an explicit `<pic>` directive whose exact
/// tag text is recorded as the image's source text. `Agentic` images record a
/// verbatim narrative excerpt and are re-anchored by fuzzy matching on every
/// render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Agentic,
    Inline,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agentic => "agentic",
            Self::Inline => "inline",
        }
    }
}

impl<'de> Deserialize<'de> for GenerationMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = SmolStr::deserialize(deserializer)?;
        match s.as_str() {
            "inline" => Ok(Self::Inline),
            _ => Ok(Self::Agentic),
        }
    }
}

/// Snapshot of one generated (or in-flight) illustration attached to an entry.
///
/// Invariant: `image_data` is present iff `status == Complete`, and
/// `error_message` is present iff `status == Failed`. The generation lifecycle
/// upholds this when transitioning records; [`EmbeddedImage::validate`] checks
/// it for snapshots arriving from persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedImage {
    pub id: SmolStr,
    /// Verbatim narrative excerpt (agentic) or exact original tag text (inline)
    /// captured when the image was requested.
    pub source_text: String,
    pub generation_mode: GenerationMode,
    pub status: ImageStatus,
    /// Base64-encoded PNG payload, present iff the image completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Owning entry.
    pub entry_id: SmolStr,
}

impl EmbeddedImage {
    /// Whether status and payload fields are mutually consistent.
    pub fn is_consistent(&self) -> bool {
        let data_ok = match self.status {
            ImageStatus::Complete => self.image_data.is_some(),
            _ => self.image_data.is_none(),
        };
        let error_ok = match self.status {
            ImageStatus::Failed => true,
            _ => self.error_message.is_none(),
        };
        data_ok && error_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        let json = serde_json::to_string(&ImageStatus::Generating).unwrap();
        assert_eq!(json, "\"generating\"");
        let back: ImageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ImageStatus::Generating);
    }

    #[test]
    fn unknown_status_falls_back_to_pending() {
        let status: ImageStatus = serde_json::from_str("\"uploading\"").unwrap();
        assert_eq!(status, ImageStatus::Pending);
    }

    #[test]
    fn unknown_mode_falls_back_to_agentic() {
        let mode: GenerationMode = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(mode, GenerationMode::Agentic);
    }

    #[test]
    fn image_snapshot_from_entry_json() {
        let json = r#"{
            "id": "img-1",
            "sourceText": "A hooded figure enters the tavern",
            "generationMode": "agentic",
            "status": "complete",
            "imageData": "aGVsbG8=",
            "entryId": "entry-1"
        }"#;
        let img: EmbeddedImage = serde_json::from_str(json).unwrap();
        assert_eq!(img.status, ImageStatus::Complete);
        assert_eq!(img.image_data.as_deref(), Some("aGVsbG8="));
        assert!(img.is_consistent());
    }

    #[test]
    fn consistency_rejects_payload_without_completion() {
        let img = EmbeddedImage {
            id: "img-2".into(),
            source_text: String::new(),
            generation_mode: GenerationMode::Agentic,
            status: ImageStatus::Generating,
            image_data: Some("aGVsbG8=".into()),
            error_message: None,
            entry_id: "entry-1".into(),
        };
        assert!(!img.is_consistent());
    }
}
