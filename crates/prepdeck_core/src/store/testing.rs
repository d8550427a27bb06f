//! Scripted in-memory [`RestClient`] for store unit tests.

use crate::api::{ApiError, ApiResult, ProgressFn, RestClient, UploadFile};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Answers requests keyed by `"<METHOD> <path>"`; uploads use `UPLOAD`.
#[derive(Default)]
pub(crate) struct FakeRest {
    responses: Mutex<HashMap<String, ApiResult<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeRest {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, key: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), Ok(body));
    }

    pub(crate) fn respond_err(&self, key: &str, err: ApiError) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), Err(err));
    }

    /// Requests seen so far with their JSON bodies (`null` for none).
    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, key: String, body: Value) -> ApiResult<Value> {
        self.calls.lock().unwrap().push((key.clone(), body));
        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::from_response(404, br#"{"detail":"Not Found"}"#)))
    }
}

#[async_trait]
impl RestClient for FakeRest {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        let query: serde_json::Map<String, Value> = query
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
            .collect();
        self.answer(format!("GET {path}"), Value::Object(query))
    }

    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.answer(format!("POST {path}"), body.clone())
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.answer(format!("PUT {path}"), body.clone())
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.answer(format!("DELETE {path}"), Value::Null)
    }

    async fn upload(
        &self,
        path: &str,
        file: UploadFile,
        progress: ProgressFn,
    ) -> ApiResult<Value> {
        progress(50);
        progress(100);
        self.answer(format!("UPLOAD {path}"), Value::String(file.file_name))
    }
}
