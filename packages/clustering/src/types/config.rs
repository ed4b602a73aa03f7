//! Configuration types for the clustering pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the clustering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Maximum items sent to the oracle in one call.
    ///
    /// Requests at or below this size are classified in a single round.
    /// Default: 50.
    pub max_batch_size: usize,

    /// Upper bound on clusters returned from a multi-batch request.
    ///
    /// When the concatenated batch output exceeds this, similar clusters
    /// are merged. Default: 20.
    pub max_clusters: usize,

    /// Name-overlap ratio a cluster must exceed to be merged.
    ///
    /// Compared strictly (`>`). Default: 0.4.
    pub merge_threshold: f64,

    /// Bound on a single oracle call. Default: 60 seconds.
    #[serde(with = "duration_secs")]
    pub oracle_timeout: Duration,

    /// How many batches of one request may be in flight at once.
    ///
    /// Default: 4.
    pub max_concurrent_batches: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 50,
            max_clusters: 20,
            merge_threshold: 0.4,
            oracle_timeout: Duration::from_secs(60),
            max_concurrent_batches: 4,
        }
    }
}

impl ClusteringConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum batch size.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Set the cluster cap.
    pub fn with_max_clusters(mut self, max: usize) -> Self {
        self.max_clusters = max;
        self
    }

    /// Set the merge threshold.
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Set the oracle timeout.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Set the number of batches dispatched concurrently.
    pub fn with_max_concurrent_batches(mut self, n: usize) -> Self {
        self.max_concurrent_batches = n;
        self
    }

    /// Batch size with zero clamped to one.
    pub fn effective_batch_size(&self) -> usize {
        self.max_batch_size.max(1)
    }

    /// Cluster cap with zero clamped to one.
    pub fn effective_max_clusters(&self) -> usize {
        self.max_clusters.max(1)
    }

    /// Concurrency with zero clamped to one.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_batches.max(1)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("timeout must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}
