//! REST boundary consumed by the stores.
//!
//! # Responsibility
//! - Define the object-safe [`RestClient`] seam the stores depend on.
//! - Keep HTTP, multipart and error-body details out of store code.
//!
//! # Invariants
//! - Success bodies are returned as raw JSON; normalization into typed
//!   resources happens in the model layer, once.
//! - Non-2xx responses always become [`ApiError::Status`] with a readable
//!   message.

mod error;
mod http;
mod upload;

pub use error::{error_message_from_body, ApiError, ApiResult};
pub use http::HttpRestClient;
pub use upload::{progress_percent, ProgressFn, UploadFile};

use async_trait::async_trait;
use serde_json::Value;

/// JSON-over-HTTP boundary used by every store.
///
/// Paths are relative to the configured API base URL and start with `/`.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// `GET path?query`.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value>;
    /// `POST path` with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value>;
    /// `PUT path` with a JSON body.
    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value>;
    /// `DELETE path`. Empty bodies decode as `Value::Null`.
    async fn delete(&self, path: &str) -> ApiResult<Value>;
    /// Multipart upload of `file` under the form field `file`.
    ///
    /// `progress` receives percentages (0-100) as the body is sent.
    async fn upload(&self, path: &str, file: UploadFile, progress: ProgressFn)
        -> ApiResult<Value>;
}
