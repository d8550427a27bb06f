//! Document chat transcript.
//!
//! # Invariants
//! - The user's message is appended before the request is sent; the assistant
//!   reply is appended only after the request succeeds.
//! - Blank document ids and blank messages never reach the network.

use crate::api::{ApiError, ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{ChatMessage, ChatRole, ResourceId};
use crate::observable::Observable;
use crate::store::{Endpoints, RemoteStore};
use serde_json::{json, Value};
use std::sync::Arc;

const CHAT_PREFIX: &str = "/v1/chat";

pub struct ChatStore {
    remote: RemoteStore<ChatMessage>,
}

impl ChatStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        Self {
            remote: RemoteStore::new(rest, Endpoints::new(CHAT_PREFIX, CHAT_PREFIX), config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<ChatMessage> {
        &self.remote
    }

    /// Transcript in send order.
    pub fn messages(&self) -> &Observable<Vec<ChatMessage>> {
        self.remote.items()
    }

    /// Sends `message` about `document_id` with the prior transcript as
    /// history, returning the assistant reply.
    ///
    /// # Errors
    /// - `Validation` when the document id or message is blank.
    /// - Any REST failure; the user's message stays in the transcript.
    pub async fn send_message(
        &self,
        document_id: &ResourceId,
        message: &str,
    ) -> ApiResult<ChatMessage> {
        self.remote
            .write("send_message", self.try_send(document_id, message))
            .await
    }

    /// Asks the service for study notes on `document_id`.
    ///
    /// Returns the `notes` payload, or `None` on failure.
    pub async fn generate_notes(
        &self,
        document_id: &ResourceId,
        topic: Option<&str>,
    ) -> Option<Value> {
        self.remote
            .read("generate_notes", self.try_generate_notes(document_id, topic))
            .await
    }

    /// Empties the transcript and clears `error`.
    pub fn clear_chat(&self) {
        self.remote.items().set(Vec::new());
        self.remote.error().set(None);
    }

    async fn try_send(&self, document_id: &ResourceId, message: &str) -> ApiResult<ChatMessage> {
        if document_id.is_blank() || message.trim().is_empty() {
            return Err(ApiError::validation("Document ID and message are required"));
        }

        let history: Vec<Value> = self
            .remote
            .items()
            .with(|messages| messages.iter().map(ChatMessage::history_entry).collect());
        self.remote.append(ChatMessage::new(ChatRole::User, message));

        let path = format!("{CHAT_PREFIX}/{}/message", document_id.path_segment());
        let body = json!({ "message": message, "history": history });
        let reply = self.remote.rest().post(&path, &body).await?;

        let answer = ChatMessage::from_reply(&reply);
        self.remote.append(answer.clone());
        Ok(answer)
    }

    async fn try_generate_notes(
        &self,
        document_id: &ResourceId,
        topic: Option<&str>,
    ) -> ApiResult<Value> {
        if document_id.is_blank() {
            return Err(ApiError::validation("Document ID is required"));
        }
        let path = format!("{CHAT_PREFIX}/{}/generate-notes", document_id.path_segment());
        let reply = self
            .remote
            .rest()
            .post(&path, &json!({ "topic": topic }))
            .await?;
        Ok(reply.get("notes").cloned().unwrap_or(Value::Null))
    }
}
