//! Media upload coordinator.
//!
//! Turns a [`MediaSelection`] into stored objects and an event manifest:
//! one batched upload-intent call, one concurrent upload task per file
//! (single-shot or multipart as the server instructs), then manifest assembly and
//! event creation. A failed file fails the whole submission; objects that were
//! already stored are left in place.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use uuid::Uuid;

use bunny_api_client::{ApiClient, EventBackend, ProgressFn, StorageUploader};
use bunny_core::models::{
    CompletedPart, Event, EventDetails, EventMediaManifestEntry, EventPayload, MediaFile,
    PartUrl, StoredMedia, UploadDescriptor, UploadIntentRequest, UploadTarget,
};
use bunny_core::{AppError, AppResult, ClientConfig};

use crate::multipart::{part_ranges, read_all, read_range};
use crate::progress::{FileProgress, ProgressReporter};
use crate::selection::MediaSelection;

const DEFAULT_MAX_CONCURRENT_PARTS: usize = 4;

/// Storage keys produced by a successful upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedMedia {
    /// Key of the cover image, kept out of the manifest
    pub cover_image_key: Option<String>,
    /// One entry per gallery file, in selection order
    pub media: Vec<EventMediaManifestEntry>,
}

/// Coordinates validation-checked files through upload and event creation.
pub struct UploadCoordinator {
    backend: Arc<dyn EventBackend>,
    storage: Arc<dyn StorageUploader>,
    progress: Arc<dyn ProgressReporter>,
    max_concurrent_parts: usize,
}

impl UploadCoordinator {
    pub fn new(
        backend: Arc<dyn EventBackend>,
        storage: Arc<dyn StorageUploader>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            backend,
            storage,
            progress,
            max_concurrent_parts: DEFAULT_MAX_CONCURRENT_PARTS,
        }
    }

    /// Coordinator backed by one API client for both the API and storage.
    pub fn from_client(
        client: ApiClient,
        config: &ClientConfig,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client, progress)
            .with_max_concurrent_parts(config.max_concurrent_parts)
    }

    pub fn with_max_concurrent_parts(mut self, max_concurrent_parts: usize) -> Self {
        self.max_concurrent_parts = max_concurrent_parts.max(1);
        self
    }

    /// Validate the form, upload all media and create the event.
    ///
    /// The event-creation endpoint is only called when every file was stored.
    pub async fn submit_event(
        &self,
        details: &EventDetails,
        selection: &MediaSelection,
    ) -> AppResult<Event> {
        details.check()?;

        let uploaded = self.upload_media(&details.title, selection).await?;
        let payload = EventPayload::new(details, uploaded.cover_image_key, uploaded.media);

        tracing::info!(
            title = %payload.title,
            media_count = payload.media.len(),
            has_cover = payload.cover_image_key.is_some(),
            "Creating event"
        );
        let event = self.backend.create_event(&payload).await?;
        tracing::info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    /// Upload every file of the selection and assemble the manifest.
    pub async fn upload_media(
        &self,
        title: &str,
        selection: &MediaSelection,
    ) -> AppResult<UploadedMedia> {
        let files = selection.files();
        if files.is_empty() {
            return Ok(UploadedMedia::default());
        }

        let request = UploadIntentRequest {
            title: title.to_string(),
            media_files: files.iter().map(|file| file.descriptor()).collect(),
        };

        tracing::info!(file_count = files.len(), "Requesting upload URLs");
        let wires = self.backend.request_upload_urls(&request).await?;

        let mut descriptors: HashMap<String, AppResult<UploadDescriptor>> = wires
            .into_iter()
            .map(|wire| (wire.id.clone(), UploadDescriptor::try_from(wire)))
            .collect();

        let tasks: Vec<_> = files
            .iter()
            .map(|file| {
                let descriptor = descriptors.remove(&file.id.to_string());
                self.upload_file(file, descriptor)
            })
            .collect();

        let results = join_all(tasks).await;
        self.progress.clear();

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(media) => stored.push(media),
                Err(err) => {
                    tracing::warn!(error = %err, "Media upload failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        Ok(assemble_manifest(selection, stored))
    }

    async fn upload_file(
        &self,
        file: &MediaFile,
        descriptor: Option<AppResult<UploadDescriptor>>,
    ) -> AppResult<StoredMedia> {
        let descriptor = match descriptor {
            Some(Ok(descriptor)) => descriptor,
            Some(Err(err)) => return Err(upload_error(file, err)),
            None => {
                return Err(AppError::MissingDescriptor {
                    file_name: file.name.clone(),
                })
            }
        };

        let multipart = match &descriptor.target {
            UploadTarget::Single { url } => {
                self.upload_single(file, url)
                    .await
                    .map_err(|e| upload_error(file, e))?;
                None
            }
            UploadTarget::Multipart { upload_id, parts } => {
                let completed = self
                    .upload_multipart(file, parts)
                    .await
                    .map_err(|e| upload_error(file, e))?;
                Some((upload_id.clone(), completed))
            }
        };

        tracing::debug!(file_name = %file.name, key = %descriptor.key, "Stored media file");
        Ok(StoredMedia {
            file_id: file.id,
            key: descriptor.key,
            multipart,
        })
    }

    async fn upload_single(&self, file: &MediaFile, url: &str) -> AppResult<()> {
        let data = read_all(&file.source).await?;
        let tracker = Arc::new(FileProgress::new(
            &file.name,
            data.len() as u64,
            self.progress.clone(),
        ));
        tracker.set_sent(0);

        let sink = tracker.clone();
        let on_progress: ProgressFn = Arc::new(move |sent| sink.set_sent(sent));
        self.storage
            .put_object(url, &file.content_type, data, on_progress)
            .await?;

        tracker.complete();
        Ok(())
    }

    async fn upload_multipart(
        &self,
        file: &MediaFile,
        parts: &[PartUrl],
    ) -> AppResult<Vec<CompletedPart>> {
        let tracker = Arc::new(FileProgress::new(
            &file.name,
            file.size,
            self.progress.clone(),
        ));
        tracker.set_sent(0);

        let ranges = part_ranges(file.size, parts.len());
        let mut completed: Vec<CompletedPart> = stream::iter(parts.iter().zip(ranges))
            .map(|(part, range)| {
                let tracker = tracker.clone();
                async move {
                    let len = range.end - range.start;
                    let data = read_range(&file.source, range).await?;

                    // Bytes of this part already added to the file total.
                    let reported = Arc::new(AtomicU64::new(0));
                    let on_progress: ProgressFn = {
                        let tracker = tracker.clone();
                        let reported = reported.clone();
                        Arc::new(move |sent| {
                            let previous = reported.fetch_max(sent, Ordering::SeqCst);
                            if sent > previous {
                                tracker.add_sent(sent - previous);
                            }
                        })
                    };
                    let etag = self.storage.put_part(&part.url, data, on_progress).await?;

                    let previous = reported.fetch_max(len, Ordering::SeqCst);
                    if len > previous {
                        tracker.add_sent(len - previous);
                    }
                    tracing::debug!(
                        file_name = %file.name,
                        part_number = part.part_number,
                        bytes = len,
                        "Uploaded part"
                    );
                    Ok::<_, AppError>(CompletedPart {
                        part_number: part.part_number,
                        etag,
                    })
                }
            })
            .buffer_unordered(self.max_concurrent_parts)
            .try_collect()
            .await?;

        completed.sort_by_key(|part| part.part_number);
        tracker.complete();
        Ok(completed)
    }
}

/// Per-file failure carrying the file name.
fn upload_error(file: &MediaFile, err: AppError) -> AppError {
    match err {
        AppError::FileUpload { .. } | AppError::MissingDescriptor { .. } => err,
        other => AppError::FileUpload {
            file_name: file.name.clone(),
            message: other.to_string(),
        },
    }
}

/// Map stored objects back onto the selection: the cover key is surfaced on its own and
/// every gallery file becomes one manifest entry.
pub fn assemble_manifest(selection: &MediaSelection, stored: Vec<StoredMedia>) -> UploadedMedia {
    let mut by_id: HashMap<Uuid, StoredMedia> =
        stored.into_iter().map(|media| (media.file_id, media)).collect();

    let cover_image_key = selection
        .cover()
        .and_then(|cover| by_id.remove(&cover.id))
        .map(|media| media.key);

    let media = selection
        .gallery()
        .iter()
        .filter_map(|item| {
            let stored = by_id.remove(&item.file.id)?;
            let (upload_id, parts) = match stored.multipart {
                Some((upload_id, parts)) => (Some(upload_id), Some(parts)),
                None => (None, None),
            };
            Some(EventMediaManifestEntry {
                key: stored.key,
                kind: item.file.kind,
                caption: item.caption.clone(),
                featured: item.featured,
                upload_id,
                parts,
            })
        })
        .collect();

    UploadedMedia {
        cover_image_key,
        media,
    }
}
