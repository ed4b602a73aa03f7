//! Field analysis for tuning: which attributes exist and what they hold.
//!
//! Read-only. Nothing here touches the oracle.

use indexmap::{IndexMap, IndexSet};

use crate::pipeline::normalize::{detect_entity_type, flatten};
use crate::profiles::{EntityTypeProfile, ProfileStore};
use crate::types::{
    analysis::FieldAnalysis,
    record::{scalar_to_string, Record},
};

const TOP_FIELDS: usize = 20;
const SAMPLES_PER_FIELD: usize = 5;
const SAMPLE_VALUE_CHARS: usize = 50;
const RECOMMENDED_FIELDS: usize = 5;

/// Analyze flattened attributes across all records.
///
/// Recommendations use `profile` when given, else the detected profile.
pub fn analyze_fields(
    records: &[Record],
    profile: Option<&EntityTypeProfile>,
    store: &ProfileStore,
) -> FieldAnalysis {
    let detected = detect_entity_type(records, store);
    let profile = profile.unwrap_or(detected);

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut values: IndexMap<String, IndexSet<String>> = IndexMap::new();

    for record in records {
        for (field, value) in flatten(record) {
            let sample: String = scalar_to_string(&value)
                .chars()
                .take(SAMPLE_VALUE_CHARS)
                .collect();
            *counts.entry(field.clone()).or_default() += 1;
            values.entry(field).or_default().insert(sample);
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_FIELDS);
    let top_fields: IndexMap<String, usize> = ranked.into_iter().collect();

    let field_samples = top_fields
        .keys()
        .map(|field| {
            let samples = values
                .get(field)
                .map(|set| set.iter().take(SAMPLES_PER_FIELD).cloned().collect())
                .unwrap_or_default();
            (field.clone(), samples)
        })
        .collect();

    FieldAnalysis {
        total_items: records.len(),
        detected_entity_type: detected.name.to_string(),
        recommended_clustering_fields: recommend_fields(&top_fields, profile),
        top_fields,
        field_samples,
    }
}

/// Core attributes present in the data, most frequent first.
pub fn recommend_fields(
    top_fields: &IndexMap<String, usize>,
    profile: &EntityTypeProfile,
) -> Vec<String> {
    let mut available: Vec<&str> = profile
        .core_attributes
        .iter()
        .copied()
        .filter(|field| top_fields.contains_key(*field))
        .collect();
    // Stable: equal counts keep core-attribute order
    available.sort_by_key(|field| std::cmp::Reverse(top_fields.get(*field).copied().unwrap_or(0)));
    available
        .into_iter()
        .take(RECOMMENDED_FIELDS)
        .map(str::to_string)
        .collect()
}
