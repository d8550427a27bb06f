//! Canonical resource shapes and boundary normalization.
//!
//! # Responsibility
//! - Map loosely-shaped server JSON into one typed shape per domain.
//! - Identify every resource by a stable [`ResourceId`].
//!
//! # Invariants
//! - Normalization happens once, when a response is received. Field
//!   fallbacks (`name` or `filename`, `front` or `question`) live here only.
//! - A record without a usable id is never cached. A single record is
//!   rejected; inside a list it is skipped with a warning so one bad row does
//!   not blank the whole collection.
//! - Collections keep server order and duplicates.

pub mod chat;
pub mod crew;
pub mod document;
pub mod dsa;
pub mod flashcard;
pub mod mindmap;
pub mod note;
pub mod preview;

pub use chat::{ChatMessage, ChatRole};
pub use crew::{Crew, CrewMember};
pub use document::Document;
pub use dsa::{DsaProblem, ProblemFilters};
pub use flashcard::{DeckDetail, Flashcard, FlashcardDeck};
pub use mindmap::{MindMap, MindMapNode};
pub use note::{Note, NoteUpdate};

use crate::api::ApiError;
use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Server-assigned identifier.
///
/// Servers send ids as strings or integers; both normalize to the same text
/// form so `1` and `"1"` address the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Reads an id from a JSON string or integer. Blank strings yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(Self::new(text.as_str())),
            Value::Number(number) => Some(Self(number.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// The id percent-encoded for use as one URL path segment.
    pub fn path_segment(&self) -> Cow<'_, str> {
        urlencoding::encode(&self.0)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&ResourceId> for ResourceId {
    fn from(value: &ResourceId) -> Self {
        value.clone()
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| D::Error::custom("resource id must be a non-blank string or integer"))
    }
}

/// Record type cached by a store.
pub trait Resource: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Short label used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> &ResourceId;

    /// Normalizes one server record into the canonical shape.
    fn from_json(value: &Value) -> Result<Self, NormalizeError>;
}

/// Server payload that could not be mapped into a canonical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    NotAnObject { kind: &'static str },
    NotAList { kind: &'static str },
    MissingId { kind: &'static str },
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { kind } => write!(f, "{kind} record is not a JSON object"),
            Self::NotAList { kind } => write!(f, "{kind} list response is not an array"),
            Self::MissingId { kind } => write!(f, "{kind} record has no usable id"),
            Self::MissingField { kind, field } => {
                write!(f, "{kind} record is missing `{field}`")
            }
        }
    }
}

impl Error for NormalizeError {}

impl From<NormalizeError> for ApiError {
    fn from(value: NormalizeError) -> Self {
        ApiError::Decode(value.to_string())
    }
}

/// Decodes a list response.
///
/// Accepts a bare array, or an object envelope holding the array under
/// `list_key`. A missing or null envelope entry decodes as empty.
pub fn decode_list<R: Resource>(
    value: &Value,
    list_key: Option<&str>,
) -> Result<Vec<R>, NormalizeError> {
    let items = match (value, list_key) {
        (Value::Array(items), _) => items,
        (Value::Null, _) => return Ok(Vec::new()),
        (Value::Object(map), Some(key)) => match map.get(key) {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(_) => return Err(NormalizeError::NotAList { kind: R::KIND }),
        },
        _ => return Err(NormalizeError::NotAList { kind: R::KIND }),
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match R::from_json(item) {
            Ok(record) => records.push(record),
            Err(err) => warn!(
                "event=decode_skip module=model status=error kind={} index={} reason={}",
                R::KIND,
                index,
                err
            ),
        }
    }
    Ok(records)
}

/// Decodes a single-record response.
///
/// When `envelope_key` names an object entry the record is read from there,
/// otherwise the whole body is the record.
pub fn decode_record<R: Resource>(
    value: &Value,
    envelope_key: Option<&str>,
) -> Result<R, NormalizeError> {
    let record = envelope_key
        .and_then(|key| value.get(key))
        .filter(|inner| inner.is_object())
        .unwrap_or(value);
    R::from_json(record)
}

/// Read-only view over one JSON object with fallback-aware accessors.
pub(crate) struct Fields<'a> {
    kind: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(kind: &'static str, value: &'a Value) -> Result<Self, NormalizeError> {
        match value {
            Value::Object(map) => Ok(Self { kind, map }),
            _ => Err(NormalizeError::NotAnObject { kind }),
        }
    }

    /// `id`, falling back to `_id`.
    pub(crate) fn id(&self) -> Result<ResourceId, NormalizeError> {
        self.id_of(&["id", "_id"])
            .ok_or(NormalizeError::MissingId { kind: self.kind })
    }

    pub(crate) fn id_of(&self, keys: &[&str]) -> Option<ResourceId> {
        self.first(keys, ResourceId::from_json)
    }

    /// First non-blank string (numbers are rendered as text).
    pub(crate) fn text(&self, keys: &[&str]) -> Option<String> {
        self.first(keys, |value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
    }

    pub(crate) fn required_text(
        &self,
        keys: &[&str],
        field: &'static str,
    ) -> Result<String, NormalizeError> {
        self.text(keys).ok_or(NormalizeError::MissingField {
            kind: self.kind,
            field,
        })
    }

    /// First non-negative integer, accepting numeric strings.
    pub(crate) fn count(&self, keys: &[&str]) -> Option<u64> {
        self.first(keys, |value| match value {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
    }

    pub(crate) fn flag(&self, keys: &[&str]) -> Option<bool> {
        self.first(keys, Value::as_bool)
    }

    pub(crate) fn array(&self, keys: &[&str]) -> Option<&'a Vec<Value>> {
        self.first(keys, Value::as_array)
    }

    pub(crate) fn strings(&self, keys: &[&str]) -> Vec<String> {
        self.array(keys)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
                        Value::Number(number) => Some(number.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn first<T>(&self, keys: &[&str], pick: impl Fn(&'a Value) -> Option<T>) -> Option<T> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find_map(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_list, decode_record, Document, NormalizeError, ResourceId};
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_normalize_identically() {
        assert_eq!(ResourceId::from_json(&json!(1)), Some(ResourceId::from("1")));
        assert_eq!(ResourceId::from_json(&json!(" 1 ")), Some(ResourceId::from(1_u64)));
        assert_eq!(ResourceId::from_json(&json!("   ")), None);
        assert_eq!(ResourceId::from_json(&json!(null)), None);
    }

    #[test]
    fn path_segment_escapes_url_delimiters() {
        assert_eq!(ResourceId::from("doc-1_a.pdf").path_segment(), "doc-1_a.pdf");
        assert_eq!(ResourceId::from("a/b?c#d").path_segment(), "a%2Fb%3Fc%23d");
        assert_eq!(ResourceId::from("two words").path_segment(), "two%20words");
    }

    #[test]
    fn resource_id_deserializes_from_number_or_string() {
        let ids: Vec<ResourceId> = serde_json::from_value(json!([7, "abc"])).unwrap();
        assert_eq!(ids, vec![ResourceId::from("7"), ResourceId::from("abc")]);
        assert!(serde_json::from_value::<ResourceId>(json!(true)).is_err());
    }

    #[test]
    fn decode_list_reads_envelope_and_bare_arrays() {
        let wrapped = json!({"documents": [{"id": 1, "name": "a.pdf"}]});
        let docs: Vec<Document> = decode_list(&wrapped, Some("documents")).unwrap();
        assert_eq!(docs.len(), 1);

        let bare = json!([{"id": 1}, {"id": 1}]);
        let docs: Vec<Document> = decode_list(&bare, Some("documents")).unwrap();
        assert_eq!(docs.len(), 2, "duplicates are kept");

        let missing: Vec<Document> = decode_list(&json!({}), Some("documents")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn decode_list_skips_bad_records_but_rejects_non_lists() {
        let docs = decode_list::<Document>(
            &json!([{"id": 1}, {"name": "no id"}, "junk", {"id": 2}]),
            None,
        )
        .unwrap();
        let ids: Vec<_> = docs.iter().map(|doc| doc.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let err = decode_list::<Document>(&json!("nope"), None).unwrap_err();
        assert_eq!(err, NormalizeError::NotAList { kind: "document" });
    }

    #[test]
    fn decode_record_rejects_record_without_id() {
        let err = decode_record::<Document>(&json!({"name": "x"}), None).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId { kind: "document" });
    }

    #[test]
    fn decode_record_unwraps_envelope_when_present() {
        let wrapped = json!({"document": {"id": 3, "name": "a.pdf"}, "status": "ok"});
        let doc: Document = decode_record(&wrapped, Some("document")).unwrap();
        assert_eq!(doc.id, ResourceId::from("3"));

        let bare = json!({"id": 4, "name": "b.pdf"});
        let doc: Document = decode_record(&bare, Some("document")).unwrap();
        assert_eq!(doc.id, ResourceId::from("4"));
    }
}
