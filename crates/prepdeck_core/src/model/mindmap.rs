//! Mind maps generated from documents.

use crate::model::preview::derive_preview_text;
use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMapNode {
    pub id: ResourceId,
    pub label: String,
    pub parent_id: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindMap {
    pub id: ResourceId,
    pub title: String,
    pub description: Option<String>,
    pub document_id: Option<ResourceId>,
    pub topic: Option<String>,
    pub source: Option<String>,
    pub preview: Option<String>,
    pub nodes: Vec<MindMapNode>,
    pub created_at: Option<String>,
}

impl MindMap {
    pub fn root(&self) -> Option<&MindMapNode> {
        self.nodes.iter().find(|node| node.parent_id.is_none())
    }

    pub fn children_of<'a>(
        &'a self,
        parent: &'a ResourceId,
    ) -> impl Iterator<Item = &'a MindMapNode> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.parent_id.as_ref() == Some(parent))
    }
}

impl Resource for MindMap {
    const KIND: &'static str = "mind map";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        let nodes = fields
            .array(&["nodes"])
            .map(|nodes| nodes.iter().map(decode_node).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();
        let description = fields.text(&["description"]);
        let preview = fields
            .text(&["preview"])
            .or_else(|| description.as_deref().and_then(derive_preview_text));
        Ok(Self {
            id: fields.id()?,
            title: fields.text(&["title"]).unwrap_or_else(|| "Untitled mind map".to_string()),
            description,
            document_id: fields.id_of(&["document_id", "documentId"]),
            topic: fields.text(&["topic"]),
            source: fields.text(&["source", "document_name"]),
            preview,
            nodes,
            created_at: fields.text(&["createdAt", "created_at"]),
        })
    }
}

fn decode_node(value: &Value) -> Result<MindMapNode, NormalizeError> {
    let fields = Fields::of("mind map node", value)?;
    Ok(MindMapNode {
        id: fields.id()?,
        label: fields.required_text(&["label", "text", "title"], "label")?,
        parent_id: fields.id_of(&["parent_id", "parentId", "parent"]),
    })
}

#[cfg(test)]
mod tests {
    use super::MindMap;
    use crate::model::{Resource, ResourceId};
    use serde_json::json;

    #[test]
    fn nodes_decode_into_a_tree() {
        let map = MindMap::from_json(&json!({
            "id": 9,
            "title": "Databases",
            "nodes": [
                {"id": "root", "label": "Databases"},
                {"id": "a", "text": "Indexes", "parent_id": "root"},
                {"id": "b", "title": "Sharding", "parent": "root"}
            ]
        }))
        .unwrap();
        assert_eq!(map.root().map(|node| node.label.as_str()), Some("Databases"));
        let root = ResourceId::from("root");
        assert_eq!(map.children_of(&root).count(), 2);
    }

    #[test]
    fn missing_nodes_decode_as_empty() {
        let map = MindMap::from_json(&json!({"id": 1, "description": "**ACID** basics"})).unwrap();
        assert!(map.nodes.is_empty());
        assert_eq!(map.preview.as_deref(), Some("ACID basics"));
    }
}
