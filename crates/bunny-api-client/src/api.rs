//! Domain methods for the back-office API client.

use crate::{extract_error_message, ApiClient, Auth};
use bunny_core::models::{
    ApiErrorBody, Event, EventCategory, EventPayload, UploadDescriptorWire, UploadIntentRequest,
    UploadIntentResponse, EVENT_CREATION_FALLBACK,
};
use bunny_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Login response. Some deployments nest the token under `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Flat { token: String },
    Nested { data: TokenData },
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token: String,
}

/// Either a bare JSON array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Wrapped { data } => data,
        }
    }
}

/// Either the record itself or `{ "data": record }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemResponse<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    fn into_inner(self) -> T {
        match self {
            ItemResponse::Wrapped { data } => data,
            ItemResponse::Bare(item) => item,
        }
    }
}

impl ApiClient {
    /// Exchange admin credentials for a token. Returns a client using Bearer auth.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(ApiClient, String)> {
        let response: LoginResponse = self
            .post_json("/auth/login", &LoginRequest { email, password })
            .await?;

        let token = match response {
            LoginResponse::Flat { token } => token,
            LoginResponse::Nested { data } => data.token,
        };

        tracing::debug!("Login succeeded");
        Ok((self.clone().with_auth(Auth::Bearer(token.clone())), token))
    }

    /// List event categories for the category picker.
    pub async fn list_event_categories(&self) -> AppResult<Vec<EventCategory>> {
        let response: ListResponse<EventCategory> = self.get("/event-categories", &[]).await?;
        Ok(response.into_vec())
    }

    /// Ask the backend for upload destinations for a batch of files.
    pub async fn request_upload_urls(
        &self,
        request: &UploadIntentRequest,
    ) -> AppResult<Vec<UploadDescriptorWire>> {
        let response = self
            .send_post_json("/uploads/presign", request)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Upload-intent request could not be sent");
                AppError::UploadIntent(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            tracing::warn!(status = %status, error = %message, "Upload-intent request failed");
            return Err(AppError::UploadIntent(message));
        }

        let body: UploadIntentResponse = response.json().await.map_err(|e| {
            AppError::UploadIntent(format!("Invalid upload-intent response: {}", e))
        })?;

        Ok(body.files)
    }

    /// Create an event. Field-level errors from the backend are joined into one message.
    pub async fn create_event(&self, payload: &EventPayload) -> AppResult<Event> {
        let response = self.send_post_json("/events", payload).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.field_errors_message())
                .unwrap_or_else(|| EVENT_CREATION_FALLBACK.to_string());
            tracing::warn!(status = %status, error = %message, "Event creation failed");
            return Err(AppError::EventCreation(message));
        }

        let event: ItemResponse<Event> = response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse created event: {}", e)))?;

        Ok(event.into_inner())
    }
}
