//! Study notes generated from or attached to documents.

use crate::model::preview::derive_preview_text;
use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: ResourceId,
    pub title: String,
    pub document_id: Option<ResourceId>,
    pub topic: Option<String>,
    /// Name of the source document as shown in list views.
    pub source: Option<String>,
    /// Markdown body.
    pub content: String,
    /// Server preview, or one derived from `content`.
    pub preview: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Partial note update; `None` fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Resource for Note {
    const KIND: &'static str = "note";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        let content = fields.text(&["content", "notes", "markdown"]).unwrap_or_default();
        let preview = fields
            .text(&["preview"])
            .or_else(|| derive_preview_text(&content));
        Ok(Self {
            id: fields.id()?,
            title: fields.text(&["title"]).unwrap_or_else(|| "Untitled notes".to_string()),
            document_id: fields.id_of(&["document_id", "documentId"]),
            topic: fields.text(&["topic"]),
            source: fields.text(&["source", "document_name"]),
            content,
            preview,
            created_at: fields.text(&["createdAt", "created_at"]),
            updated_at: fields.text(&["updatedAt", "updated_at"]),
        })
    }
}
