//! Validation modules

pub mod media;

pub use media::{
    classify, content_type_for_extension, file_extension, validate_media_file, MediaLimits,
    MediaRules,
};
