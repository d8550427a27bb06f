//! Uploaded study documents.

use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

const UNTITLED_DOCUMENT: &str = "Untitled document";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: ResourceId,
    /// Display name; servers send `name`, `filename` or `title`.
    pub name: String,
    pub file_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub pages: Option<u64>,
    /// Server processing state (for example `processed`).
    pub status: Option<String>,
    pub uploaded_at: Option<String>,
}

impl Resource for Document {
    const KIND: &'static str = "document";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        Ok(Self {
            id: fields.id()?,
            name: fields
                .text(&["name", "filename", "title"])
                .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string()),
            file_type: fields.text(&["type", "file_type", "content_type"]),
            size_bytes: fields.count(&["size", "file_size"]),
            pages: fields.count(&["pages", "page_count"]),
            status: fields.text(&["status"]),
            uploaded_at: fields.text(&["uploadDate", "upload_date", "uploaded_at", "created_at"]),
        })
    }
}
