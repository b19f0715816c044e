//! Seams between the upload coordinator and the network.
//!
//! The coordinator only talks to these traits, so callers inject the API client (or a
//! fake in tests) instead of relying on shared global state.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::ApiClient;
use bunny_core::models::{Event, EventPayload, UploadDescriptorWire, UploadIntentRequest};
use bunny_core::AppResult;

/// Callback receiving the cumulative number of bytes sent for one object.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Event-management API used by the coordinator.
#[async_trait]
pub trait EventBackend: Send + Sync {
    /// Issue one upload descriptor per submitted file.
    async fn request_upload_urls(
        &self,
        request: &UploadIntentRequest,
    ) -> AppResult<Vec<UploadDescriptorWire>>;

    /// Create the event from the assembled payload.
    async fn create_event(&self, payload: &EventPayload) -> AppResult<Event>;
}

/// Direct-to-storage uploads.
#[async_trait]
pub trait StorageUploader: Send + Sync {
    /// Store a whole object at a pre-signed URL.
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<()>;

    /// Store one multipart part, reporting bytes sent; returns its entity tag.
    async fn put_part(
        &self,
        url: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<String>;
}

#[async_trait]
impl EventBackend for ApiClient {
    async fn request_upload_urls(
        &self,
        request: &UploadIntentRequest,
    ) -> AppResult<Vec<UploadDescriptorWire>> {
        ApiClient::request_upload_urls(self, request).await
    }

    async fn create_event(&self, payload: &EventPayload) -> AppResult<Event> {
        ApiClient::create_event(self, payload).await
    }
}

#[async_trait]
impl StorageUploader for ApiClient {
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<()> {
        ApiClient::put_object(self, url, content_type, data, on_progress).await
    }

    async fn put_part(
        &self,
        url: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<String> {
        ApiClient::put_part(self, url, data, on_progress).await
    }
}
