//! The oracle's raw grouping claim over one batch.

/// An ordered list of proposed clusters referencing batch-local indices.
///
/// Nothing about a proposal is trusted: indices may be out of range,
/// repeated, or missing. See [`crate::pipeline::reconcile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposal {
    pub clusters: Vec<ProposedCluster>,
}

impl Proposal {
    /// Create a proposal from clusters.
    pub fn new(clusters: impl IntoIterator<Item = ProposedCluster>) -> Self {
        Self {
            clusters: clusters.into_iter().collect(),
        }
    }

    /// Number of proposed clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the oracle proposed nothing.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// One proposed cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedCluster {
    /// Brief descriptive name
    pub name: String,

    /// Why these items were grouped
    pub reasoning: String,

    /// Claimed batch-local indices (signed: the oracle may emit negatives)
    pub item_indices: Vec<i64>,
}

impl ProposedCluster {
    /// Create a new proposed cluster.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reasoning: String::new(),
            item_indices: Vec::new(),
        }
    }

    /// Add claimed indices.
    pub fn with_indices(mut self, indices: impl IntoIterator<Item = i64>) -> Self {
        self.item_indices.extend(indices);
        self
    }

    /// Set the reasoning.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}
