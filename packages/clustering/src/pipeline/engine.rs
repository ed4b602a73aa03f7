//! The Clusterer - main entry point for the clustering library.
//!
//! Orchestrates normalize → plan → {oracle → reconcile | fallback} → merge.
//! Every branch ends in a complete partition of the request's records.

use std::time::Instant;

use futures::{stream, StreamExt};
use tracing::{error, info, warn};

use crate::error::{ClusteringError, Result};
use crate::pipeline::{
    analyze::analyze_fields,
    batch::{plan, Batch},
    fallback::{fallback_cluster, FallbackScope},
    merge::merge_similar_clusters,
    normalize::{self, resolve_profile},
    reconcile::reconcile_response,
};
use crate::profiles::{EntityTypeProfile, ProfileStore};
use crate::traits::oracle::{Oracle, OracleRequest};
use crate::types::{
    cluster::Cluster,
    config::ClusteringConfig,
    record::NormalizedItem,
    request::{ClusterRequest, ClusterResponse, FieldExtractionReport, FieldExtractionRequest},
};

/// Longest oracle payload excerpt written to the log on decode failure.
const PAYLOAD_EXCERPT_CHARS: usize = 500;

/// Instruction-driven clusterer over an oracle.
///
/// # Example
///
/// ```rust,ignore
/// let clusterer = Clusterer::new(oracle);
/// let request = ClusterRequest::new("webset-1", records, "group by director");
/// let response = clusterer.cluster(&request).await?;
/// ```
pub struct Clusterer<O: Oracle> {
    oracle: O,
    profiles: ProfileStore,
    config: ClusteringConfig,
}

impl<O: Oracle> Clusterer<O> {
    /// Create a clusterer with default configuration and built-in profiles.
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, ClusteringConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(oracle: O, config: ClusteringConfig) -> Self {
        Self {
            oracle,
            profiles: ProfileStore::default(),
            config,
        }
    }

    /// Replace the profile store.
    pub fn with_profiles(mut self, profiles: ProfileStore) -> Self {
        self.profiles = profiles;
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Get a reference to the oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Get the profile store.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Cluster a request's records by its instruction.
    ///
    /// Only validation failures are returned as errors; oracle trouble of
    /// any kind degrades into fallback clusters.
    pub async fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResponse> {
        let started = Instant::now();
        request.validate()?;

        info!(
            webset_id = %request.webset_id,
            items = request.items.len(),
            query = %request.query,
            entity_type = ?request.entity_type,
            "Processing cluster request"
        );

        let profile = resolve_profile(
            request.entity_type.as_deref(),
            &request.items,
            &self.profiles,
        );
        let items = normalize::extract(&request.items, profile, &request.query);
        let clusters = self.cluster_items(&items, &request.query, profile).await;

        let processing_time_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let total_clusters = clusters.len();
        info!(
            clusters = total_clusters,
            processing_time_ms,
            "Cluster request complete"
        );

        Ok(ClusterResponse {
            reasoning: format!(
                "Clustered {} items into {} groups based on: {}",
                request.items.len(),
                total_clusters,
                request.query
            ),
            clusters,
            processing_time_ms,
            total_items: request.items.len(),
            total_clusters,
        })
    }

    /// Cluster normalized items.
    ///
    /// Small inputs take one oracle round; larger ones are split into
    /// batches classified concurrently, reassembled in batch order, and
    /// merged down to the cluster cap.
    pub async fn cluster_items(
        &self,
        items: &[NormalizedItem<'_>],
        instruction: &str,
        profile: &EntityTypeProfile,
    ) -> Vec<Cluster> {
        if items.is_empty() {
            return Vec::new();
        }

        let batch_size = self.config.effective_batch_size();
        if items.len() <= batch_size {
            return self
                .classify_or_fallback(Batch::whole(items), instruction, profile, FallbackScope::Request)
                .await;
        }

        let batches = plan(items, batch_size);
        info!(
            items = items.len(),
            batches = batches.len(),
            "Large dataset detected, using multi-pass clustering"
        );

        let tasks: Vec<_> = batches
            .into_iter()
            .map(|batch| {
                self.classify_or_fallback(
                    batch,
                    instruction,
                    profile,
                    FallbackScope::Batch(batch.ordinal),
                )
            })
            .collect();

        // `buffered` yields in input order regardless of completion order
        let per_batch: Vec<Vec<Cluster>> = stream::iter(tasks)
            .buffered(self.config.effective_concurrency())
            .collect()
            .await;

        let clusters: Vec<Cluster> = per_batch.into_iter().flatten().collect();

        let max_clusters = self.config.effective_max_clusters();
        if clusters.len() > max_clusters {
            merge_similar_clusters(clusters, max_clusters, self.config.merge_threshold)
        } else {
            clusters
        }
    }

    /// Classify one batch, substituting a fallback cluster on any failure.
    async fn classify_or_fallback(
        &self,
        batch: Batch<'_, '_>,
        instruction: &str,
        profile: &EntityTypeProfile,
        scope: FallbackScope,
    ) -> Vec<Cluster> {
        match self.classify_batch(batch, instruction, profile).await {
            Ok(clusters) => {
                info!(
                    batch = batch.ordinal,
                    clusters = clusters.len(),
                    "Generated clusters"
                );
                clusters
            }
            Err(e) => {
                warn!(batch = batch.ordinal, error = %e, "Clustering failed");
                fallback_cluster(batch.items, scope, &fallback_reason(&e))
            }
        }
    }

    /// Classify one batch through the oracle and reconcile the answer.
    ///
    /// The oracle call is bounded by `oracle_timeout`.
    pub async fn classify_batch(
        &self,
        batch: Batch<'_, '_>,
        instruction: &str,
        profile: &EntityTypeProfile,
    ) -> Result<Vec<Cluster>> {
        let request = OracleRequest {
            items: batch.items,
            instruction,
            entity_type: profile.name,
            guidance: profile.guidance,
        };

        info!(
            batch = batch.ordinal,
            items = batch.len(),
            "Sending clustering request to oracle"
        );

        let timeout = self.config.oracle_timeout;
        let raw = tokio::time::timeout(timeout, self.oracle.classify(&request))
            .await
            .map_err(|_| ClusteringError::Timeout { after: timeout })??;

        reconcile_response(&raw, batch.items).inspect_err(|e| {
            let excerpt: String = raw.chars().take(PAYLOAD_EXCERPT_CHARS).collect();
            error!(batch = batch.ordinal, error = %e, response = %excerpt, "Failed to parse clustering response");
        })
    }

    /// Normalize and analyze records without calling the oracle.
    pub fn extract_fields<'a>(&self, request: &'a FieldExtractionRequest) -> FieldExtractionReport<'a> {
        let hinted = request
            .entity_type
            .as_deref()
            .and_then(|hint| self.profiles.get(hint));
        let profile = resolve_profile(
            request.entity_type.as_deref(),
            &request.items,
            &self.profiles,
        );

        FieldExtractionReport {
            extracted_items: normalize::extract(&request.items, profile, &request.query),
            field_analysis: analyze_fields(&request.items, hinted, &self.profiles),
            total_items: request.items.len(),
        }
    }
}

fn fallback_reason(error: &ClusteringError) -> String {
    match error {
        ClusteringError::Decode { .. } => {
            "Failed to parse clustering response".to_string()
        }
        other => format!("Clustering failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reconcile::OTHER_ITEMS_NAME;
    use crate::profiles::MOVIE;
    use crate::testing::MockOracle;
    use crate::types::cluster::total_count;
    use crate::types::record::Record;
    use serde_json::json;
    use std::time::Duration;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| json!({"id": i.to_string(), "name": format!("Movie {i}")}))
            .collect()
    }

    #[tokio::test]
    async fn test_cluster_rejects_invalid_request() {
        let clusterer = Clusterer::new(MockOracle::replying("{}"));
        let request = ClusterRequest::new("ws", vec![], "group by director");

        let err = clusterer.cluster(&request).await.unwrap_err();

        assert!(matches!(err, ClusteringError::Validation { .. }));
        assert!(clusterer.oracle().calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_round_uses_whole_request() {
        let oracle = MockOracle::replying(
            r#"{"clusters": [{"name": "First", "reasoning": "r", "item_indices": [0]}]}"#,
        );
        let clusterer = Clusterer::new(oracle);
        let request = ClusterRequest::new("ws", records(3), "group by director");

        let response = clusterer.cluster(&request).await.unwrap();

        assert_eq!(response.total_items, 3);
        assert_eq!(response.total_clusters, 2);
        assert_eq!(response.clusters[1].name, OTHER_ITEMS_NAME);
        assert_eq!(
            response.reasoning,
            "Clustered 3 items into 2 groups based on: group by director"
        );
        assert_eq!(clusterer.oracle().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_falls_back() {
        let clusterer = Clusterer::new(MockOracle::replying("definitely not json"));
        let request = ClusterRequest::new("ws", records(4), "by genre");

        let response = clusterer.cluster(&request).await.unwrap();

        assert_eq!(response.clusters.len(), 1);
        assert_eq!(response.clusters[0].name, "All Items");
        assert_eq!(
            response.clusters[0].reasoning,
            "Fallback cluster: Failed to parse clustering response"
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let config = ClusteringConfig::new().with_oracle_timeout(Duration::from_millis(20));
        let clusterer = Clusterer::with_config(MockOracle::hanging(), config);
        let request = ClusterRequest::new("ws", records(2), "by genre");

        let response = clusterer.cluster(&request).await.unwrap();

        assert_eq!(response.clusters.len(), 1);
        assert!(response.clusters[0].reasoning.contains("timed out"));
    }

    #[tokio::test]
    async fn test_batch_failure_is_local() {
        // Fails only for the second batch (positions 2..4)
        let oracle = MockOracle::from_fn(|request| {
            if request.items[0].position == 2 {
                Err(ClusteringError::Oracle("model overloaded".into()))
            } else {
                Ok(r#"{"clusters": [{"name": "Pair", "item_indices": [0, 1]}]}"#.to_string())
            }
        });
        let config = ClusteringConfig::new().with_max_batch_size(2);
        let clusterer = Clusterer::with_config(oracle, config);
        let records = records(6);
        let items = normalize::extract(&records, &MOVIE, "group");

        let clusters = clusterer.cluster_items(&items, "group", &MOVIE).await;

        let names: Vec<_> = clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Pair", "All Items (Batch 2)", "Pair"]);
        assert_eq!(total_count(&clusters), 6);
    }

    #[tokio::test]
    async fn test_extract_fields_report() {
        let clusterer = Clusterer::new(MockOracle::replying("{}"));
        let request = FieldExtractionRequest {
            items: vec![json!({"id": "1", "name": "Heat", "director": "Michael Mann"})],
            entity_type: Some("movie".to_string()),
            query: "group by director".to_string(),
        };

        let report = clusterer.extract_fields(&request);

        assert_eq!(report.total_items, 1);
        assert_eq!(report.field_analysis.detected_entity_type, "movie");
        assert_eq!(
            *report.extracted_items[0].attribute("director").unwrap(),
            "Michael Mann"
        );
        assert!(clusterer.oracle().calls().is_empty());
    }

    #[test]
    fn test_fallback_reason_text() {
        assert_eq!(
            fallback_reason(&ClusteringError::decode("x")),
            "Failed to parse clustering response"
        );
        assert_eq!(
            fallback_reason(&ClusteringError::Oracle("down".into())),
            "Clustering failed: oracle error: down"
        );
    }
}
