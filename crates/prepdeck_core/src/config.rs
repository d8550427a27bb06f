//! Client configuration.
//!
//! # Responsibility
//! - Resolve the API base URL and timing knobs used by the stores.
//!
//! # Invariants
//! - `api_base_url` never ends with `/` and always uses an http(s) scheme.
//! - Blank environment values are ignored in favour of defaults.

use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "PREPDECK_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_UPLOAD_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every REST path is appended to.
    pub api_base_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout: Duration,
    /// Delay after an upload settles before `upload_progress` returns to 0.
    pub upload_reset_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_reset_delay: DEFAULT_UPLOAD_RESET_DELAY,
        }
    }
}

impl ClientConfig {
    /// Builds a config for an explicit base URL.
    ///
    /// # Errors
    /// - Returns an error when the URL is blank or not http(s).
    pub fn with_base_url(base_url: &str) -> Result<Self, String> {
        Ok(Self {
            api_base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Reads [`API_URL_ENV`], falling back to [`DEFAULT_API_BASE_URL`].
    pub fn from_env() -> Result<Self, String> {
        match std::env::var(API_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::with_base_url(&raw),
            _ => Ok(Self::default()),
        }
    }

    pub fn upload_reset_delay(mut self, delay: Duration) -> Self {
        self.upload_reset_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("api base url cannot be empty".to_string());
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!(
            "api base url must start with http:// or https://, got `{trimmed}`"
        ));
    }
    Ok(trimmed.to_string())
}
