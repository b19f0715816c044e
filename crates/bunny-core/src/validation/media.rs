//! File rules for event media.
//!
//! A file is accepted when its extension is in the allowlist for its kind and its size
//! does not exceed that kind's maximum. Rules are independent for images and videos.

use std::path::Path;

use crate::error::AppError;
use crate::models::MediaKind;

/// Size and format limits for one media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLimits {
    pub max_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

/// Limits for every media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRules {
    pub image: MediaLimits,
    pub video: MediaLimits,
}

impl MediaRules {
    pub fn limits_for(&self, kind: MediaKind) -> &MediaLimits {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }
}

impl Default for MediaRules {
    fn default() -> Self {
        Self {
            image: MediaLimits {
                max_bytes: 5 * 1024 * 1024,
                allowed_extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            video: MediaLimits {
                max_bytes: 100 * 1024 * 1024,
                allowed_extensions: ["mp4", "mov", "webm", "avi", "mkv"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}

/// Lowercased extension of a file name, empty when there is none.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Media kind of an upload, decided by its MIME type.
pub fn classify(content_type: &str) -> MediaKind {
    MediaKind::from_content_type(content_type)
}

/// Check one file against the limits of its kind.
///
/// The format check runs first so an oversized file in a forbidden format reports the format.
pub fn validate_media_file(
    rules: &MediaRules,
    file_name: &str,
    size: u64,
    kind: MediaKind,
) -> Result<(), AppError> {
    let limits = rules.limits_for(kind);

    let extension = file_extension(file_name);
    if !limits.allowed_extensions.iter().any(|e| *e == extension) {
        return Err(AppError::UnsupportedFormat {
            kind,
            file_name: file_name.to_string(),
            allowed: limits.allowed_extensions.clone(),
        });
    }

    if size > limits.max_bytes {
        return Err(AppError::FileTooLarge {
            kind,
            file_name: file_name.to_string(),
            max_bytes: limits.max_bytes,
        });
    }

    Ok(())
}

/// MIME type for a known media extension.
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        _ => return None,
    };
    Some(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn classify_uses_mime_prefix() {
        assert_eq!(classify("video/quicktime"), MediaKind::Video);
        assert_eq!(classify("image/png"), MediaKind::Image);
        assert_eq!(classify("application/octet-stream"), MediaKind::Image);
    }

    #[test]
    fn accepts_files_within_limits() {
        let rules = MediaRules::default();
        assert!(validate_media_file(&rules, "cover.JPG", 2 * MB, MediaKind::Image).is_ok());
        assert!(validate_media_file(&rules, "race.mp4", 20 * MB, MediaKind::Video).is_ok());
        assert!(validate_media_file(&rules, "exact.png", 5 * MB, MediaKind::Image).is_ok());
    }

    #[test]
    fn rejects_oversized_file() {
        let rules = MediaRules::default();
        let err = validate_media_file(&rules, "huge.png", 5 * MB + 1, MediaKind::Image)
            .unwrap_err();
        match err {
            AppError::FileTooLarge {
                kind, max_bytes, ..
            } => {
                assert_eq!(kind, MediaKind::Image);
                assert_eq!(max_bytes, 5 * MB);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_disallowed_extension() {
        let rules = MediaRules::default();
        let err = validate_media_file(&rules, "clip.flv", MB, MediaKind::Video).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { .. }));
        let err = validate_media_file(&rules, "noext", MB, MediaKind::Image).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { .. }));
    }

    #[test]
    fn image_extension_not_valid_for_video() {
        let rules = MediaRules::default();
        assert!(validate_media_file(&rules, "photo.png", MB, MediaKind::Video).is_err());
    }

    #[test]
    fn content_types_for_extensions() {
        assert_eq!(content_type_for_extension("JPEG"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("mov"), Some("video/quicktime"));
        assert_eq!(content_type_for_extension("exe"), None);
        assert_eq!(file_extension("a.b.Png"), "png");
        assert_eq!(file_extension("README"), "");
    }
}
