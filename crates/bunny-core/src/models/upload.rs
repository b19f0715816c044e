use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaFileDescriptor;
use crate::error::AppError;

/// Request body of the upload-intent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadIntentRequest {
    /// Event title, used by the backend to organize storage keys
    pub title: String,
    pub media_files: Vec<MediaFileDescriptor>,
}

/// Response body of the upload-intent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadIntentResponse {
    #[serde(default)]
    pub files: Vec<UploadDescriptorWire>,
}

/// Upload descriptor as sent by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptorWire {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub multipart: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<PartUrl>>,
}

/// Pre-signed URL for one part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUrl {
    /// 1-based part number
    pub part_number: u32,
    pub url: String,
}

/// How one file must be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Whole file in one PUT
    Single { url: String },
    /// One PUT per part, sorted by part number
    Multipart {
        upload_id: String,
        parts: Vec<PartUrl>,
    },
}

/// Server-issued instruction for storing one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub id: String,
    pub key: String,
    pub target: UploadTarget,
}

impl UploadDescriptor {
    pub fn is_multipart(&self) -> bool {
        matches!(self.target, UploadTarget::Multipart { .. })
    }
}

impl TryFrom<UploadDescriptorWire> for UploadDescriptor {
    type Error = AppError;

    fn try_from(wire: UploadDescriptorWire) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| AppError::InvalidDescriptor {
            id: wire.id.clone(),
            reason: reason.to_string(),
        };

        if wire.key.trim().is_empty() {
            return Err(invalid("missing storage key"));
        }

        let target = if wire.multipart {
            let upload_id = wire
                .upload_id
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| invalid("multipart descriptor without uploadId"))?;
            let mut parts = wire
                .parts
                .clone()
                .filter(|parts| !parts.is_empty())
                .ok_or_else(|| invalid("multipart descriptor without parts"))?;
            parts.sort_by_key(|p| p.part_number);
            if parts.windows(2).any(|w| w[0].part_number == w[1].part_number) {
                return Err(invalid("duplicate part number"));
            }
            if parts.iter().any(|p| p.part_number == 0) {
                return Err(invalid("part numbers start at 1"));
            }
            UploadTarget::Multipart { upload_id, parts }
        } else {
            let url = wire
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| invalid("single-part descriptor without url"))?;
            UploadTarget::Single { url }
        };

        Ok(UploadDescriptor {
            id: wire.id,
            key: wire.key,
            target,
        })
    }
}

/// Entity tag returned by storage for one uploaded part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    pub part_number: u32,
    pub etag: String,
}

/// Outcome of storing one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub file_id: Uuid,
    pub key: String,
    /// Multipart session id and completed parts; `None` for single-shot uploads
    pub multipart: Option<(String, Vec<CompletedPart>)>,
}
