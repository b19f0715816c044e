//! HTTP client for the Bunny Babies back-office API.
//!
//! Provides a client with configurable auth (Bearer token or X-API-Key), generic
//! GET/POST helpers, domain methods (login, event categories, upload-intent, event
//! creation) and raw PUT uploads to pre-signed storage URLs.

pub mod api;
pub mod storage;
pub mod traits;

use bunny_core::{AppError, AppResult, ClientConfig};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use traits::{EventBackend, ProgressFn, StorageUploader};

/// Authentication strategy for the API.
#[derive(Clone, Debug, Default)]
pub enum Auth {
    /// No credentials (public endpoints, login)
    #[default]
    Anonymous,
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// HTTP client for the back-office API with configurable auth.
///
/// Holds two connection pools: one with a request timeout for JSON calls and one
/// without a total timeout for storage uploads, which may take arbitrarily long.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    storage_client: Client,
    base_url: String,
    api_prefix: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> AppResult<Self> {
        let config = ClientConfig {
            api_url: base_url,
            ..ClientConfig::default()
        };
        Self::from_config(&config).map(|client| client.with_auth(auth))
    }

    /// Create client from a loaded configuration. Bearer token wins over API key.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let storage_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create storage HTTP client: {}", e))
            })?;

        let auth = match (&config.api_token, &config.api_key) {
            (Some(token), _) => Auth::Bearer(token.clone()),
            (None, Some(key)) => Auth::XApiKey(key.clone()),
            (None, None) => Auth::Anonymous,
        };

        Ok(Self {
            client,
            storage_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: BUNNY_API_URL, BUNNY_API_TOKEN or BUNNY_API_KEY.
    pub fn from_env() -> AppResult<Self> {
        let config = ClientConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        Self::from_config(&config)
    }

    /// Same client with different credentials.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path relative to the prefix, e.g. `/events`.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Anonymous => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.build_url(path);
        let mut request = self.apply_auth(self.client.get(&url));

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to send request: {}", e)))?;

        Self::json_or_error(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self.send_post_json(path, body).await?;
        Self::json_or_error(response).await
    }

    /// POST JSON body and return the raw response, whatever its status.
    pub(crate) async fn send_post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<reqwest::Response> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).json(body));

        request
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to send request: {}", e)))
    }

    async fn json_or_error<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse response as JSON: {}", e)))
    }

    pub(crate) fn storage_client(&self) -> &Client {
        &self.storage_client
    }
}

/// Best-effort message from an error response body: JSON `message`, then `error`,
/// then the raw text.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<bunny_core::models::ApiErrorBody>(body) {
        if let Some(message) = parsed.summary() {
            return message;
        }
        if let Some(message) = parsed.field_errors_message() {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = extract_error_message(body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Unauthorized(message)
    } else {
        AppError::Http(format!(
            "API request failed with status {}: {}",
            status, message
        ))
    }
}
