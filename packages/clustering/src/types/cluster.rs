//! Output clusters.

use serde::Serialize;

use crate::types::record::Record;

/// Separator placed between reasonings of merged clusters.
pub const MERGE_MARKER: &str = " | Merged with: ";

/// A named group of records.
///
/// `count` always equals the number of records held; the fields that could
/// break that are private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Descriptive name of the grouping
    pub name: String,

    /// Why these records belong together
    pub reasoning: String,

    items: Vec<Record>,

    count: usize,
}

impl Cluster {
    /// Create a cluster over the given records.
    pub fn new(name: impl Into<String>, reasoning: impl Into<String>, items: Vec<Record>) -> Self {
        let count = items.len();
        Self {
            name: name.into(),
            reasoning: reasoning.into(),
            items,
            count,
        }
    }

    /// Records in this cluster, in insertion order.
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the cluster holds no records.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Consume the cluster, returning its records.
    pub fn into_items(self) -> Vec<Record> {
        self.items
    }

    /// Fold another cluster into this one.
    ///
    /// Items are appended and the other reasoning is kept after
    /// [`MERGE_MARKER`]. The other cluster's name is dropped.
    pub fn absorb(&mut self, other: Cluster) {
        self.reasoning.push_str(MERGE_MARKER);
        self.reasoning.push_str(&other.reasoning);
        self.extend_items(other.items);
    }

    /// Append records without touching name or reasoning.
    pub fn extend_items(&mut self, items: impl IntoIterator<Item = Record>) {
        self.items.extend(items);
        self.count = self.items.len();
    }
}

/// Total records across a set of clusters.
pub fn total_count(clusters: &[Cluster]) -> usize {
    clusters.iter().map(Cluster::count).sum()
}
