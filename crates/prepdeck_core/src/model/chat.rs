//! Chat transcript entries for document Q&A.

use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Reply text used when the service answers without any content field.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't process that request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" | "ai" | "bot" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Client-generated; chat messages are not persisted server-side.
    pub id: ResourceId,
    pub role: ChatRole,
    pub content: String,
    pub html_content: Option<String>,
    /// Unix epoch milliseconds at creation.
    pub timestamp_ms: i64,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(Uuid::new_v4().to_string()),
            role,
            content: content.into(),
            html_content: None,
            timestamp_ms: now_epoch_ms(),
        }
    }

    /// Builds the assistant entry from a chat endpoint reply.
    ///
    /// Content fallbacks: `response`, `text`, `content`, `markdown`, then a
    /// nested `message.content`.
    pub fn from_reply(reply: &Value) -> Self {
        let fields = Fields::of(Self::KIND, reply).ok();
        let content = fields
            .as_ref()
            .and_then(|fields| fields.text(&["response", "text", "content", "markdown"]))
            .or_else(|| {
                reply
                    .get("message")
                    .and_then(|message| message.get("content"))
                    .and_then(Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_string)
            })
            .or_else(|| reply.as_str().map(str::to_string))
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());

        let mut message = Self::new(ChatRole::Assistant, content);
        message.html_content = fields.and_then(|fields| fields.text(&["htmlContent", "html"]));
        message
    }

    /// `{role, content}` pair sent as conversation history.
    pub fn history_entry(&self) -> Value {
        json!({ "role": self.role.as_str(), "content": self.content })
    }
}

impl Resource for ChatMessage {
    const KIND: &'static str = "chat message";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        let role = fields
            .text(&["role"])
            .and_then(|role| ChatRole::parse(&role))
            .ok_or(NormalizeError::MissingField {
                kind: Self::KIND,
                field: "role",
            })?;
        Ok(Self {
            id: fields.id()?,
            role,
            content: fields.text(&["content"]).unwrap_or_default(),
            html_content: fields.text(&["htmlContent", "html_content", "html"]),
            timestamp_ms: fields
                .count(&["timestamp_ms", "timestamp"])
                .and_then(|ms| i64::try_from(ms).ok())
                .unwrap_or_else(now_epoch_ms),
        })
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
