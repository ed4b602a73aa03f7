//! Request and response shapes at the clustering boundary.

use serde::{Deserialize, Serialize};

use crate::error::{ClusteringError, Result};
use crate::types::{
    analysis::FieldAnalysis,
    cluster::Cluster,
    record::{NormalizedItem, Record},
};

/// A request to partition a collection by a free-text instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRequest {
    /// Identifier of the collection the records belong to
    pub webset_id: String,

    /// Heterogeneous records, in caller order
    pub items: Vec<Record>,

    /// Free-text grouping instruction (e.g. "group by director")
    pub query: String,

    /// Optional entity-type hint (e.g. "movie")
    #[serde(default)]
    pub entity_type: Option<String>,
}

impl ClusterRequest {
    /// Create a request.
    pub fn new(webset_id: impl Into<String>, items: Vec<Record>, query: impl Into<String>) -> Self {
        Self {
            webset_id: webset_id.into(),
            items,
            query: query.into(),
            entity_type: None,
        }
    }

    /// Set the entity-type hint.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Reject requests that must not enter the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(ClusteringError::validation(
                "No items provided for clustering",
            ));
        }
        if self.query.trim().is_empty() {
            return Err(ClusteringError::validation(
                "Clustering query cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Result of a clustering request.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterResponse {
    /// Final clusters, in deterministic order
    pub clusters: Vec<Cluster>,

    /// Wall-clock time spent in the pipeline
    pub processing_time_ms: u64,

    /// Number of input records
    pub total_items: usize,

    /// Number of returned clusters
    pub total_clusters: usize,

    /// One-line summary of the grouping performed
    pub reasoning: String,
}

/// A diagnostic request: normalize and analyze without classifying.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldExtractionRequest {
    #[serde(default)]
    pub items: Vec<Record>,

    #[serde(default)]
    pub entity_type: Option<String>,

    #[serde(default)]
    pub query: String,
}

/// Normalizer output plus a frequency analysis of the records.
#[derive(Debug, Clone, Serialize)]
pub struct FieldExtractionReport<'a> {
    pub extracted_items: Vec<NormalizedItem<'a>>,
    pub field_analysis: FieldAnalysis,
    pub total_items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_rejects_empty_items() {
        let request = ClusterRequest::new("ws", vec![], "group by director");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, ClusteringError::Validation { .. }));
    }

    #[test]
    fn test_validate_rejects_blank_query() {
        let request = ClusterRequest::new("ws", vec![json!({"id": "1"})], "  \t\n");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let request = ClusterRequest::new("ws", vec![json!({"id": "1"})], "by genre");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_deserialize_without_hint() {
        let request: ClusterRequest = serde_json::from_value(json!({
            "webset_id": "ws-1",
            "items": [{"id": "1"}],
            "query": "group by director"
        }))
        .unwrap();

        assert!(request.entity_type.is_none());
        assert_eq!(request.items.len(), 1);
    }
}
