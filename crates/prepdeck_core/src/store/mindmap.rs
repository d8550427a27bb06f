//! Mind maps.

use crate::api::{ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{MindMap, ResourceId};
use crate::store::{Endpoints, RemoteStore};
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_MAX_DEPTH: u32 = 3;

pub struct MindMapStore {
    remote: RemoteStore<MindMap>,
}

impl MindMapStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        let endpoints = Endpoints::new("/mindmaps/all", "/mindmaps")
            .list_key("mindmaps")
            .create_path("/mindmaps/create");
        Self {
            remote: RemoteStore::new(rest, endpoints, config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<MindMap> {
        &self.remote
    }

    pub async fn fetch_mind_maps(&self) -> Vec<MindMap> {
        self.remote.fetch_all().await
    }

    pub async fn fetch_mind_map(&self, id: &ResourceId) -> Option<MindMap> {
        self.remote.fetch_one(id).await
    }

    /// Generates a mind map, appends it and makes it `current`.
    pub async fn create_mind_map(
        &self,
        document_id: &ResourceId,
        title: &str,
        topic: &str,
        max_depth: u32,
    ) -> ApiResult<MindMap> {
        let payload = json!({
            "document_id": document_id,
            "title": title,
            "topic": topic,
            "max_depth": max_depth,
        });
        let created = self.remote.create(&payload).await?;
        self.remote.current().set(Some(created.clone()));
        Ok(created)
    }

    pub async fn delete_mind_map(&self, id: &ResourceId) -> ApiResult<bool> {
        self.remote.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::{MindMapStore, DEFAULT_MAX_DEPTH};
    use crate::config::ClientConfig;
    use crate::model::ResourceId;
    use crate::store::testing::FakeRest;
    use serde_json::json;

    #[tokio::test]
    async fn create_selects_new_map() {
        let rest = FakeRest::new();
        rest.respond(
            "POST /mindmaps/create",
            json!({"id": "m1", "title": "DP", "nodes": [{"id": "r", "label": "DP"}]}),
        );
        let store = MindMapStore::new(rest.clone(), &ClientConfig::default());

        let map = store
            .create_mind_map(&ResourceId::from("doc"), "DP", "", DEFAULT_MAX_DEPTH)
            .await
            .unwrap();

        assert_eq!(store.remote().current().get(), Some(map.clone()));
        assert_eq!(store.remote().items().get(), vec![map]);
        assert_eq!(rest.calls()[0].1["max_depth"], json!(3));
    }

    #[tokio::test]
    async fn list_accepts_bare_array() {
        let rest = FakeRest::new();
        rest.respond("GET /mindmaps/all", json!([{"id": 1}, {"id": 2}]));
        let store = MindMapStore::new(rest.clone(), &ClientConfig::default());

        assert_eq!(store.fetch_mind_maps().await.len(), 2);
    }
}
