//! Field-frequency analysis returned by the diagnostic interface.

use indexmap::IndexMap;
use serde::Serialize;

/// Frequency analysis of flattened attributes across a record list.
#[derive(Debug, Clone, Serialize)]
pub struct FieldAnalysis {
    /// Number of records analyzed
    pub total_items: usize,

    /// Entity type chosen by detection
    pub detected_entity_type: String,

    /// Most frequent attribute names with their counts, most frequent first
    pub top_fields: IndexMap<String, usize>,

    /// Distinct example values per top attribute
    pub field_samples: IndexMap<String, Vec<String>>,

    /// Core attributes of the profile worth clustering on
    pub recommended_clustering_fields: Vec<String>,
}
