//! Bunny Babies Core Library
//!
//! Domain models, error types, configuration and media file rules shared by the
//! API client, the upload coordinator and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{validate_media_file, MediaLimits, MediaRules};

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;
