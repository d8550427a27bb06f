//! reqwest-backed [`RestClient`].

use crate::api::upload::{progress_percent, ProgressFn, UploadFile};
use crate::api::{ApiError, ApiResult, RestClient};
use crate::config::ClientConfig;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder, Response};
use serde_json::Value;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP implementation of the REST boundary.
///
/// Cloning is cheap; the inner reqwest client shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpRestClient {
    base_url: String,
    client: Client,
}

impl HttpRestClient {
    /// Builds a client for `config.api_base_url`.
    ///
    /// # Errors
    /// - `Transport` when the underlying TLS/HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("event=api_request module=api method={method} url={url}");
        self.client.request(method, url)
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        let mut builder = self.request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        read_json(builder.send().await?).await
    }

    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        read_json(response).await
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        read_json(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        read_json(self.request(Method::DELETE, path).send().await?).await
    }

    async fn upload(
        &self,
        path: &str,
        file: UploadFile,
        progress: ProgressFn,
    ) -> ApiResult<Value> {
        let total = file.bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = file
            .bytes
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();

        // Progress advances as hyper pulls each chunk off the stream.
        let mut sent = 0_u64;
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            progress(progress_percent(sent, total));
            Ok::<Vec<u8>, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> ApiResult<Value> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.bytes().await?;

    if !status.is_success() {
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!(
            "event=api_error module=api status={} url={} message={}",
            status.as_u16(),
            url,
            err.message()
        );
        return Err(err);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&body)?)
}
