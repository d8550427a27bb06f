//! Study notes.

use crate::api::{ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{Note, NoteUpdate, ResourceId};
use crate::store::{Endpoints, RemoteStore};
use serde_json::{json, Value};
use std::sync::Arc;

const GENERATE_PATH: &str = "/notes/generate";

pub struct NotesStore {
    remote: RemoteStore<Note>,
}

impl NotesStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        let endpoints = Endpoints::new("/notes/all", "/notes")
            .list_key("notes")
            .create_path("/notes/create");
        Self {
            remote: RemoteStore::new(rest, endpoints, config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<Note> {
        &self.remote
    }

    pub async fn fetch_notes(&self) -> Vec<Note> {
        self.remote.fetch_all().await
    }

    pub async fn fetch_note(&self, id: &ResourceId) -> Option<Note> {
        self.remote.fetch_one(id).await
    }

    /// Creates an empty note set for a document.
    pub async fn create_notes(
        &self,
        document_id: &ResourceId,
        title: &str,
        topic: &str,
    ) -> ApiResult<Note> {
        self.remote
            .create(&note_request(document_id, title, topic))
            .await
    }

    /// Generates AI study notes and appends them like a created note.
    pub async fn generate_notes(
        &self,
        document_id: &ResourceId,
        title: &str,
        topic: &str,
    ) -> ApiResult<Note> {
        let payload = note_request(document_id, title, topic);
        self.remote
            .write("generate_notes", self.remote.try_create(GENERATE_PATH, &payload))
            .await
    }

    pub async fn update_note(&self, id: &ResourceId, update: &NoteUpdate) -> ApiResult<Note> {
        let payload = serde_json::to_value(update)?;
        self.remote.update(id, &payload).await
    }

    pub async fn delete_note(&self, id: &ResourceId) -> ApiResult<bool> {
        self.remote.delete(id).await
    }
}

fn note_request(document_id: &ResourceId, title: &str, topic: &str) -> Value {
    json!({ "document_id": document_id, "title": title, "topic": topic })
}
