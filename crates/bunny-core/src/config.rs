//! Configuration module
//!
//! Client configuration is read from the environment (and `.env` via dotenvy): API
//! location and credentials, HTTP timeouts, media size/format limits and multipart
//! concurrency.

use std::env;

use crate::models::MediaKind;
use crate::validation::{MediaLimits, MediaRules};

const API_URL: &str = "http://localhost:3000";
const API_PREFIX: &str = "/api";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_IMAGE_SIZE_MB: u64 = 5;
const MAX_VIDEO_SIZE_MB: u64 = 100;
const MAX_CONCURRENT_PARTS: usize = 4;
const IMAGE_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif,webp";
const VIDEO_ALLOWED_EXTENSIONS: &str = "mp4,mov,webm,avi,mkv";

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_prefix: String,
    /// Bearer token (takes precedence over the API key)
    pub api_token: Option<String>,
    /// Value for the X-API-Key header
    pub api_key: Option<String>,
    /// Timeout for JSON API calls. Storage uploads only use the connect timeout.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub media_rules: MediaRules,
    /// Parts of one multipart upload in flight at the same time
    pub max_concurrent_parts: usize,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            api_prefix: API_PREFIX.to_string(),
            api_token: None,
            api_key: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            media_rules: MediaRules::default(),
            max_concurrent_parts: MAX_CONCURRENT_PARTS,
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let parse_mb = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match var(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", key)),
                None => Ok(default),
            }
        };

        let extensions = |key: &str, default: &str| -> Vec<String> {
            var(key)
                .unwrap_or_else(|| default.to_string())
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let media_rules = MediaRules {
            image: MediaLimits {
                max_bytes: parse_mb("MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB)? * 1024 * 1024,
                allowed_extensions: extensions(
                    "IMAGE_ALLOWED_EXTENSIONS",
                    IMAGE_ALLOWED_EXTENSIONS,
                ),
            },
            video: MediaLimits {
                max_bytes: parse_mb("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)? * 1024 * 1024,
                allowed_extensions: extensions(
                    "VIDEO_ALLOWED_EXTENSIONS",
                    VIDEO_ALLOWED_EXTENSIONS,
                ),
            },
        };

        let config = ClientConfig {
            api_url: var("BUNNY_API_URL")
                .or_else(|| var("API_URL"))
                .unwrap_or_else(|| API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_prefix: var("BUNNY_API_PREFIX").unwrap_or_else(|| API_PREFIX.to_string()),
            api_token: var("BUNNY_API_TOKEN"),
            api_key: var("BUNNY_API_KEY"),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: var("CONNECT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECT_TIMEOUT_SECS),
            media_rules,
            max_concurrent_parts: var("MAX_CONCURRENT_PARTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONCURRENT_PARTS),
            environment: var("ENVIRONMENT")
                .or_else(|| var("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "BUNNY_API_URL must start with http:// or https://"
            ));
        }

        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(anyhow::anyhow!("BUNNY_API_PREFIX must start with '/'"));
        }

        for kind in [MediaKind::Image, MediaKind::Video] {
            let limits = self.media_rules.limits_for(kind);
            if limits.max_bytes == 0 {
                return Err(anyhow::anyhow!(
                    "Maximum {} size must be greater than 0",
                    kind
                ));
            }
            if limits.allowed_extensions.is_empty() {
                return Err(anyhow::anyhow!(
                    "At least one allowed {} extension must be configured",
                    kind
                ));
            }
        }

        if self.max_concurrent_parts == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_PARTS must be at least 1"));
        }

        Ok(())
    }

    /// Check if the client is pointed at production
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
