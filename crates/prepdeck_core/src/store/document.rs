//! Uploaded source documents.

use crate::api::{ApiResult, RestClient, UploadFile};
use crate::config::ClientConfig;
use crate::model::{Document, ResourceId};
use crate::store::{require_id, Endpoints, RemoteStore};
use serde_json::Value;
use std::sync::Arc;

pub struct DocumentStore {
    remote: RemoteStore<Document>,
}

impl DocumentStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        let endpoints = Endpoints::new("/v1/documents/all", "/v1/documents")
            .list_key("documents")
            .upload_path("/v1/documents/upload");
        Self {
            remote: RemoteStore::new(rest, endpoints, config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<Document> {
        &self.remote
    }

    pub async fn fetch_documents(&self) -> Vec<Document> {
        self.remote.fetch_all().await
    }

    pub async fn fetch_document(&self, id: &ResourceId) -> Option<Document> {
        self.remote.fetch_one(id).await
    }

    pub async fn upload_document(&self, file: UploadFile) -> ApiResult<Document> {
        self.remote.upload_with_progress(file).await
    }

    pub async fn delete_document(&self, id: &ResourceId) -> ApiResult<bool> {
        self.remote.delete(id).await
    }

    /// Extracted text of a document. Read policy: `None` on failure.
    pub async fn get_document_text(&self, id: &ResourceId) -> Option<String> {
        self.remote
            .read("get_document_text", self.try_document_text(id))
            .await
    }

    async fn try_document_text(&self, id: &ResourceId) -> ApiResult<String> {
        let id = require_id("document", id)?;
        let path = format!("{}/text", self.remote.endpoints().item_path(id));
        let body = self.remote.rest().get(&path, &[]).await?;
        Ok(text_from_body(&body))
    }
}

fn text_from_body(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["text", "content"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentStore;
    use crate::config::ClientConfig;
    use crate::model::ResourceId;
    use crate::store::testing::FakeRest;
    use serde_json::json;

    #[tokio::test]
    async fn documents_list_reads_envelope() {
        let rest = FakeRest::new();
        rest.respond(
            "GET /v1/documents/all",
            json!({"documents": [{"id": 1, "filename": "cv.pdf"}, {"_id": "b", "name": "jd.docx"}]}),
        );
        let store = DocumentStore::new(rest.clone(), &ClientConfig::default());

        let docs = store.fetch_documents().await;
        let names: Vec<_> = docs.iter().map(|doc| doc.name.as_str()).collect();
        assert_eq!(names, vec!["cv.pdf", "jd.docx"]);
        assert_eq!(store.remote().items().get(), docs);
    }

    #[tokio::test]
    async fn document_text_accepts_object_or_string() {
        let rest = FakeRest::new();
        rest.respond("GET /v1/documents/1/text", json!({"text": "Chapter 1"}));
        rest.respond("GET /v1/documents/2/text", json!("raw"));
        let store = DocumentStore::new(rest.clone(), &ClientConfig::default());

        assert_eq!(
            store.get_document_text(&ResourceId::from("1")).await.as_deref(),
            Some("Chapter 1")
        );
        assert_eq!(
            store.get_document_text(&ResourceId::from("2")).await.as_deref(),
            Some("raw")
        );
    }

    #[tokio::test]
    async fn document_text_failure_is_swallowed() {
        let rest = FakeRest::new();
        let store = DocumentStore::new(rest.clone(), &ClientConfig::default());

        assert!(store.get_document_text(&ResourceId::from("3")).await.is_none());
        assert_eq!(store.remote().error().get().as_deref(), Some("Not Found"));
    }
}
