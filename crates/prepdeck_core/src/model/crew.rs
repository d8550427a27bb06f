//! Study crews: shared document sets with members.

use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MEMBER_ROLE: &str = "member";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewMember {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crew {
    pub id: ResourceId,
    pub name: String,
    pub description: Option<String>,
    /// Ids of documents shared with the crew.
    pub documents: Vec<ResourceId>,
    pub members: Vec<CrewMember>,
}

impl Crew {
    /// Copy of this crew with `document_id` appended to its documents.
    pub fn with_document(&self, document_id: ResourceId) -> Self {
        let mut crew = self.clone();
        crew.documents.push(document_id);
        crew
    }
}

impl Resource for Crew {
    const KIND: &'static str = "crew";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        let documents = fields
            .array(&["documents", "document_ids"])
            .map(|items| items.iter().filter_map(document_ref).collect())
            .unwrap_or_default();
        let members = fields
            .array(&["members"])
            .map(|items| items.iter().filter_map(decode_member).collect())
            .unwrap_or_default();
        Ok(Self {
            id: fields.id()?,
            name: fields.required_text(&["name", "title"], "name")?,
            description: fields.text(&["description"]),
            documents,
            members,
        })
    }
}

/// Documents arrive either as bare ids or as embedded document objects.
fn document_ref(value: &Value) -> Option<ResourceId> {
    ResourceId::from_json(value).or_else(|| value.get("id").and_then(ResourceId::from_json))
}

fn decode_member(value: &Value) -> Option<CrewMember> {
    if let Some(username) = value.as_str() {
        return Some(CrewMember {
            username: username.to_string(),
            role: DEFAULT_MEMBER_ROLE.to_string(),
        });
    }
    let fields = Fields::of(Crew::KIND, value).ok()?;
    Some(CrewMember {
        username: fields.text(&["username", "name"])?,
        role: fields
            .text(&["role"])
            .unwrap_or_else(|| DEFAULT_MEMBER_ROLE.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::Crew;
    use crate::model::{Resource, ResourceId};
    use serde_json::json;

    #[test]
    fn documents_and_members_accept_mixed_shapes() {
        let crew = Crew::from_json(&json!({
            "id": 5,
            "name": "FAANG prep",
            "documents": [1, {"id": "doc-2"}, null],
            "members": ["ana", {"username": "li", "role": "owner"}]
        }))
        .unwrap();
        assert_eq!(crew.documents, vec![ResourceId::from("1"), ResourceId::from("doc-2")]);
        assert_eq!(crew.members[0].role, "member");
        assert_eq!(crew.members[1].role, "owner");
    }

    #[test]
    fn with_document_leaves_source_crew_untouched() {
        let crew = Crew::from_json(&json!({"id": 1, "name": "c"})).unwrap();
        let extended = crew.with_document(ResourceId::from("d"));
        assert!(crew.documents.is_empty());
        assert_eq!(extended.documents.len(), 1);
    }
}
