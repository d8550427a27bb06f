//! Study crews.

use crate::api::{ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{Crew, ResourceId};
use crate::store::{require_id, Endpoints, RemoteStore};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct CrewStore {
    remote: RemoteStore<Crew>,
}

impl CrewStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        Self {
            remote: RemoteStore::new(rest, Endpoints::new("/crews", "/crews"), config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<Crew> {
        &self.remote
    }

    pub async fn fetch_crews(&self) -> Vec<Crew> {
        self.remote.fetch_all().await
    }

    pub async fn get_crew(&self, id: &ResourceId) -> Option<Crew> {
        self.remote.fetch_one(id).await
    }

    pub async fn create_crew(&self, name: &str, description: &str) -> ApiResult<Crew> {
        self.remote
            .create(&json!({ "name": name, "description": description }))
            .await
    }

    /// Shares a document with a crew; the cached crew gains the document id.
    pub async fn add_document_to_crew(
        &self,
        crew_id: &ResourceId,
        document_id: &ResourceId,
    ) -> ApiResult<Value> {
        self.remote
            .write("add_document_to_crew", self.try_add_document(crew_id, document_id))
            .await
    }

    pub async fn add_member_to_crew(
        &self,
        crew_id: &ResourceId,
        username: &str,
        role: &str,
    ) -> ApiResult<Value> {
        let payload = json!({ "username": username, "role": role });
        self.remote
            .write("add_member_to_crew", self.post_under(crew_id, "members", payload))
            .await
    }

    /// Starts a collaborative study session; the response is service-defined.
    pub async fn create_study_session(
        &self,
        crew_id: &ResourceId,
        topic: &str,
        document_id: Option<&ResourceId>,
        task_type: &str,
    ) -> ApiResult<Value> {
        let payload = json!({
            "topic": topic,
            "document_id": document_id,
            "task_type": task_type,
        });
        self.remote
            .write("create_study_session", self.post_under(crew_id, "study", payload))
            .await
    }

    async fn try_add_document(
        &self,
        crew_id: &ResourceId,
        document_id: &ResourceId,
    ) -> ApiResult<Value> {
        let document_id = require_id("document", document_id)?;
        let reply = self
            .post_under(crew_id, "documents", json!({ "document_id": document_id }))
            .await?;
        self.remote.items().update(|crews| {
            crews
                .iter()
                .map(|crew| {
                    if crew.id == *crew_id {
                        crew.with_document(document_id.clone())
                    } else {
                        crew.clone()
                    }
                })
                .collect()
        });
        Ok(reply)
    }

    async fn post_under(&self, crew_id: &ResourceId, leaf: &str, payload: Value) -> ApiResult<Value> {
        let crew_id = require_id("crew", crew_id)?;
        let path = format!("{}/{leaf}", self.remote.endpoints().item_path(crew_id));
        self.remote.rest().post(&path, &payload).await
    }
}
