use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use uuid::Uuid;

/// Kind of media attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Anything that is not `video/*` is treated as an image.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.trim().to_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Capitalized label for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Where the bytes of a selected file live.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// File on local disk, read when the upload starts
    Path(PathBuf),
    /// Bytes already held in memory
    Memory(Bytes),
}

/// A locally selected file accepted for upload.
///
/// The `id` is generated on acceptance and correlates the file with the
/// upload descriptor the server returns for it.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub kind: MediaKind,
    pub source: MediaSource,
}

impl MediaFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        kind: MediaKind,
        source: MediaSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size,
            content_type: content_type.into(),
            kind,
            source,
        }
    }

    /// In-memory file; the kind is derived from the content type.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let content_type = content_type.into();
        let data = data.into();
        let kind = MediaKind::from_content_type(&content_type);
        Self::new(
            name,
            data.len() as u64,
            content_type,
            kind,
            MediaSource::Memory(data),
        )
    }

    /// Descriptor sent to the upload-intent endpoint for this file.
    pub fn descriptor(&self) -> MediaFileDescriptor {
        MediaFileDescriptor {
            id: self.id.to_string(),
            content_type: self.content_type.clone(),
            size: self.size,
            kind: self.kind,
        }
    }
}

/// Per-file entry of an upload-intent request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFileDescriptor {
    pub id: String,
    pub content_type: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_mime_prefix() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("Video/QuickTime"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(
            MediaKind::from_content_type("application/octet-stream"),
            MediaKind::Image
        );
    }

    #[test]
    fn descriptor_wire_shape() {
        let file = MediaFile::from_bytes("clip.mp4", "video/mp4", vec![0u8; 10]);
        let json = serde_json::to_value(file.descriptor()).unwrap();
        assert_eq!(json["id"], file.id.to_string());
        assert_eq!(json["contentType"], "video/mp4");
        assert_eq!(json["size"], 10);
        assert_eq!(json["type"], "video");
    }

    #[test]
    fn ids_are_unique() {
        let a = MediaFile::from_bytes("a.png", "image/png", vec![1u8]);
        let b = MediaFile::from_bytes("a.png", "image/png", vec![1u8]);
        assert_ne!(a.id, b.id);
    }
}
