//! Error types module
//!
//! All failures of the upload workflow are unified under the `AppError` enum: local
//! validation errors, upload-intent failures, per-file storage failures and event-creation
//! failures. `ErrorMetadata` lets callers decide how to present and log each of them.

use std::io;

use crate::models::MediaKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a rejected upload
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the user can fix this by correcting input and trying again
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{file_name} exceeds the maximum {kind} size of {} MB", .max_bytes / 1024 / 1024)]
    FileTooLarge {
        kind: MediaKind,
        file_name: String,
        max_bytes: u64,
    },

    #[error("Unsupported {kind} format for {file_name}. Allowed: {}", .allowed.join(", "))]
    UnsupportedFormat {
        kind: MediaKind,
        file_name: String,
        allowed: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to get upload URLs: {0}")]
    UploadIntent(String),

    #[error("Invalid upload descriptor for {id}: {reason}")]
    InvalidDescriptor { id: String, reason: String },

    #[error("No upload URL returned for {file_name}")]
    MissingDescriptor { file_name: String },

    #[error("Failed to upload {file_name}: {message}")]
    FileUpload { file_name: String, message: String },

    #[error("Failed to create event: {0}")]
    EventCreation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::FileTooLarge { .. } => (
            "FILE_TOO_LARGE",
            true,
            Some("Choose a smaller file"),
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat { .. } => (
            "UNSUPPORTED_FORMAT",
            true,
            Some("Choose a file in one of the allowed formats"),
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            true,
            Some("Check the event details and try again"),
            LogLevel::Debug,
        ),
        AppError::UploadIntent(_) => (
            "UPLOAD_INTENT_FAILED",
            true,
            Some("Submit the event again"),
            LogLevel::Warn,
        ),
        AppError::InvalidDescriptor { .. } => (
            "INVALID_UPLOAD_DESCRIPTOR",
            true,
            Some("Submit the event again"),
            LogLevel::Error,
        ),
        AppError::MissingDescriptor { .. } => (
            "MISSING_UPLOAD_DESCRIPTOR",
            true,
            Some("Submit the event again"),
            LogLevel::Error,
        ),
        AppError::FileUpload { .. } => (
            "FILE_UPLOAD_FAILED",
            true,
            Some("Check your connection and submit again"),
            LogLevel::Warn,
        ),
        AppError::EventCreation(_) => (
            "EVENT_CREATION_FAILED",
            true,
            Some("Fix the listed fields and submit again"),
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            "UNAUTHORIZED",
            false,
            Some("Log in again"),
            LogLevel::Debug,
        ),
        AppError::Http(_) => (
            "HTTP_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check environment configuration"),
            LogLevel::Error,
        ),
        AppError::Io(_) => (
            "IO_ERROR",
            true,
            Some("Check that the file still exists and is readable"),
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Whether this error was raised locally before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::FileTooLarge { .. }
                | AppError::UnsupportedFormat { .. }
                | AppError::InvalidInput(_)
        )
    }

    /// Name of the file this error is about, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            AppError::FileTooLarge { file_name, .. }
            | AppError::UnsupportedFormat { file_name, .. }
            | AppError::MissingDescriptor { file_name }
            | AppError::FileUpload { file_name, .. } => Some(file_name),
            _ => None,
        }
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::FileTooLarge {
                kind, max_bytes, ..
            } => format!(
                "{} must be {} MB or smaller",
                kind.label(),
                max_bytes / 1024 / 1024
            ),
            AppError::UnsupportedFormat { kind, allowed, .. } => format!(
                "Unsupported {} format. Allowed: {}",
                kind,
                allowed.join(", ")
            ),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UploadIntent(ref msg) => msg.clone(),
            AppError::InvalidDescriptor { .. } => {
                "The server returned an invalid upload destination".to_string()
            }
            AppError::MissingDescriptor { file_name } => {
                format!("No upload destination was issued for {}", file_name)
            }
            AppError::FileUpload { file_name, .. } => format!("Failed to upload {}", file_name),
            AppError::EventCreation(ref msg) => msg.clone(),
            AppError::Unauthorized(_) => "Your session has expired".to_string(),
            AppError::Http(_) => "Could not reach the server".to_string(),
            AppError::Config(ref msg) => msg.clone(),
            AppError::Io(_) => "Could not read the selected file".to_string(),
            AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_file_too_large() {
        let err = AppError::FileTooLarge {
            kind: MediaKind::Image,
            file_name: "big.jpg".to_string(),
            max_bytes: 5 * 1024 * 1024,
        };
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(err.is_recoverable());
        assert!(err.is_validation());
        assert_eq!(err.client_message(), "Image must be 5 MB or smaller");
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.file_name(), Some("big.jpg"));
    }

    #[test]
    fn test_error_metadata_unsupported_format() {
        let err = AppError::UnsupportedFormat {
            kind: MediaKind::Video,
            file_name: "clip.flv".to_string(),
            allowed: vec!["mp4".to_string(), "mov".to_string()],
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert_eq!(err.client_message(), "Unsupported video format. Allowed: mp4, mov");
        assert!(err.to_string().contains("clip.flv"));
    }

    #[test]
    fn test_file_upload_names_file() {
        let err = AppError::FileUpload {
            file_name: "sports.mp4".to_string(),
            message: "status 500".to_string(),
        };
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Failed to upload sports.mp4: status 500");
        assert_eq!(err.client_message(), "Failed to upload sports.mp4");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::Unauthorized("expired".to_string());
        assert_eq!(err.suggested_action(), Some("Log in again"));
        assert!(!err.is_recoverable());

        let err = AppError::MissingDescriptor {
            file_name: "a.png".to_string(),
        };
        assert_eq!(err.suggested_action(), Some("Submit the event again"));
        assert_eq!(err.file_name(), Some("a.png"));
    }
}
