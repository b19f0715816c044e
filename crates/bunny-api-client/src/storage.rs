//! Direct uploads to pre-signed storage URLs.
//!
//! Storage PUTs carry no API credentials: the pre-signed URL is the credential.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};

use crate::{extract_error_message, ApiClient, ProgressFn};
use bunny_core::{AppError, AppResult};

/// Size of the body slices handed to the HTTP client; progress is reported per slice.
pub const PROGRESS_CHUNK_SIZE: usize = 64 * 1024;

/// Split a buffer into cheap reference-counted slices.
fn chunk(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let len = data.len();
    (0..len)
        .step_by(chunk_size.max(1))
        .map(|start| data.slice(start..(start + chunk_size).min(len)))
        .collect()
}

/// Body that reports the cumulative number of bytes handed to the connection.
fn progress_body(data: Bytes, on_progress: ProgressFn) -> reqwest::Body {
    let mut sent: u64 = 0;
    let chunks = chunk(&data, PROGRESS_CHUNK_SIZE);
    let stream = stream::iter(chunks).map(move |piece| {
        sent += piece.len() as u64;
        on_progress(sent);
        Ok::<Bytes, std::io::Error>(piece)
    });
    reqwest::Body::wrap_stream(stream)
}

async fn check_storage_response(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Http(format!(
        "Storage responded with status {}: {}",
        status,
        extract_error_message(&body)
    )))
}

impl ApiClient {
    /// PUT a whole object to a pre-signed URL, reporting bytes sent.
    pub async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<()> {
        let len = data.len();
        let response = self
            .storage_client()
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, len)
            .body(progress_body(data, on_progress))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Storage upload failed: {}", e)))?;

        check_storage_response(response).await?;
        tracing::debug!(bytes = len, "Stored object");
        Ok(())
    }

    /// PUT one part of a multipart upload, reporting bytes sent, and return the part's
    /// entity tag.
    pub async fn put_part(
        &self,
        url: &str,
        data: Bytes,
        on_progress: ProgressFn,
    ) -> AppResult<String> {
        let len = data.len();
        let response = self
            .storage_client()
            .put(url)
            .header(CONTENT_LENGTH, len)
            .body(progress_body(data, on_progress))
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Part upload failed: {}", e)))?;

        let response = check_storage_response(response).await?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Http("Storage did not return an ETag for part".to_string()))?;

        Ok(etag)
    }
}
