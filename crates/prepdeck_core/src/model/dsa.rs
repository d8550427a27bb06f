//! Data-structures-and-algorithms practice problems.

use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsaProblem {
    pub id: ResourceId,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub companies: Vec<String>,
}

/// Optional filters for the problem list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemFilters {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub company: Option<String>,
    pub limit: Option<u32>,
}

impl ProblemFilters {
    /// Query pairs for present, non-blank filters, in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let text_filters = [
            ("category", &self.category),
            ("difficulty", &self.difficulty),
            ("company", &self.company),
        ];
        for (key, value) in text_filters {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.push((key, value.to_string()));
            }
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

impl Resource for DsaProblem {
    const KIND: &'static str = "dsa problem";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        Ok(Self {
            id: fields.id()?,
            title: fields.required_text(&["title", "name"], "title")?,
            description: fields.text(&["description", "problem_description"]),
            difficulty: fields.text(&["difficulty"]),
            category: fields.text(&["category", "topic"]),
            companies: fields.strings(&["companies", "company_tags"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ProblemFilters;

    #[test]
    fn blank_filters_are_omitted() {
        let filters = ProblemFilters {
            category: Some("graphs".to_string()),
            difficulty: Some("  ".to_string()),
            company: None,
            limit: Some(20),
        };
        assert_eq!(
            filters.to_query(),
            vec![("category", "graphs".to_string()), ("limit", "20".to_string())]
        );
        assert!(ProblemFilters::default().to_query().is_empty());
    }
}
