//! DSA practice problems.

use crate::api::{ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{DsaProblem, ProblemFilters, ResourceId};
use crate::store::{require_id, Endpoints, RemoteStore};
use serde_json::{json, Value};
use std::sync::Arc;

const PROBLEMS_PATH: &str = "/dsa/problems";

pub struct DsaStore {
    remote: RemoteStore<DsaProblem>,
}

impl DsaStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        Self {
            remote: RemoteStore::new(rest, Endpoints::new(PROBLEMS_PATH, PROBLEMS_PATH), config),
        }
    }

    pub fn remote(&self) -> &RemoteStore<DsaProblem> {
        &self.remote
    }

    pub async fn fetch_problems(&self, filters: &ProblemFilters) -> Vec<DsaProblem> {
        self.remote.fetch_all_with(&filters.to_query()).await
    }

    pub async fn get_problem(&self, id: &ResourceId) -> Option<DsaProblem> {
        self.remote.fetch_one(id).await
    }

    /// Submits code for grading; the verdict is service-defined.
    pub async fn submit_solution(
        &self,
        problem_id: &ResourceId,
        code: &str,
        language: &str,
    ) -> ApiResult<Value> {
        self.remote
            .write("submit_solution", self.try_submit(problem_id, code, language))
            .await
    }

    pub async fn get_recommendations(
        &self,
        user_profile: &Value,
        target_companies: &[String],
        difficulty_level: &str,
        topics: &[String],
    ) -> ApiResult<Value> {
        let payload = json!({
            "user_profile": user_profile,
            "target_companies": target_companies,
            "difficulty_level": difficulty_level,
            "topics": topics,
        });
        self.remote
            .write("get_recommendations", self.remote.rest().post("/dsa/recommend", &payload))
            .await
    }

    pub async fn analyze_pattern(
        &self,
        problem_description: &str,
        similar_problems: &[String],
    ) -> ApiResult<Value> {
        let payload = json!({
            "problem_description": problem_description,
            "similar_problems": similar_problems,
        });
        self.remote
            .write("analyze_pattern", self.remote.rest().post("/dsa/analyze-pattern", &payload))
            .await
    }

    async fn try_submit(&self, problem_id: &ResourceId, code: &str, language: &str) -> ApiResult<Value> {
        let problem_id = require_id("dsa problem", problem_id)?;
        let path = format!("{PROBLEMS_PATH}/{}/submit", problem_id.path_segment());
        self.remote
            .rest()
            .post(&path, &json!({ "code": code, "language": language }))
            .await
    }
}
