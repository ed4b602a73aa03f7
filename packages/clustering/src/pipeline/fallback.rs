//! Fallback - one safe cluster when classification cannot be trusted.

use tracing::warn;

use crate::types::{cluster::Cluster, record::NormalizedItem};

/// Name of the whole-request fallback cluster.
pub const ALL_ITEMS_NAME: &str = "All Items";

/// What a fallback cluster covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackScope {
    /// Every item of the request (single-round path).
    Request,

    /// One failing batch of a multi-batch request (zero-based ordinal).
    Batch(usize),
}

impl FallbackScope {
    /// Cluster name for this scope.
    pub fn cluster_name(&self) -> String {
        match self {
            Self::Request => ALL_ITEMS_NAME.to_string(),
            Self::Batch(ordinal) => format!("{} (Batch {})", ALL_ITEMS_NAME, ordinal + 1),
        }
    }
}

/// Put every item in scope into a single cluster.
///
/// Never fails. The reasoning names the failure cause.
pub fn fallback_cluster(
    items: &[NormalizedItem<'_>],
    scope: FallbackScope,
    reason: &str,
) -> Vec<Cluster> {
    warn!(?scope, items = items.len(), reason, "Using fallback cluster");

    let records = items.iter().map(|item| item.record.clone()).collect();
    vec![Cluster::new(
        scope.cluster_name(),
        format!("Fallback cluster: {reason}"),
        records,
    )]
}
