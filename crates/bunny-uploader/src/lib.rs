//! Bunny Babies event media uploader
//!
//! Validates cover and gallery files, stores them directly in object storage
//! through server-issued pre-signed URLs and creates the event with the resulting
//! media manifest.

pub mod coordinator;
pub mod multipart;
pub mod progress;
pub mod selection;

pub use coordinator::{assemble_manifest, UploadCoordinator, UploadedMedia};
pub use progress::{FileProgress, NoopProgress, ProgressReporter, ProgressTracker, TracingProgress};
pub use selection::{accept, partition, CandidateFile, GalleryItem, MediaSelection, Partition};
