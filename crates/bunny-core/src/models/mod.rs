//! Data models for the event media workflow
//!
//! Selected files, server upload descriptors, progress entries and the event payload
//! with its media manifest.

mod event;
mod media;
mod progress;
mod upload;

pub use event::*;
pub use media::*;
pub use progress::*;
pub use upload::*;
