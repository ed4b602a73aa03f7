//! Merge similar clusters when there are too many.

use std::collections::HashSet;

use tracing::info;

use crate::types::cluster::Cluster;

/// Word-overlap ratio between two cluster names.
///
/// |shared words| / |all words|, over lower-cased whitespace tokens.
/// Two empty names have similarity 0.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let a_words: HashSet<&str> = a_lower.split_whitespace().collect();
    let b_words: HashSet<&str> = b_lower.split_whitespace().collect();

    let union = a_words.union(&b_words).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a_words.intersection(&b_words).count();
    shared as f64 / union as f64
}

/// Whether two names are similar enough to merge (strictly above threshold).
pub fn are_similar(a: &str, b: &str, threshold: f64) -> bool {
    name_similarity(a, b) > threshold
}

/// Reduce clusters towards `max_clusters` by merging similar names.
///
/// Greedy, single pass in input order: each unvisited cluster absorbs every
/// later unvisited cluster whose name is similar to its own original name.
/// Once `max_clusters` clusters have been emitted, the items of every
/// cluster not yet visited are appended to the last emitted cluster.
/// No item is ever dropped.
pub fn merge_similar_clusters(
    clusters: Vec<Cluster>,
    max_clusters: usize,
    threshold: f64,
) -> Vec<Cluster> {
    let max_clusters = max_clusters.max(1);
    if clusters.len() <= max_clusters {
        return clusters;
    }

    let before = clusters.len();
    let names: Vec<String> = clusters.iter().map(|c| c.name.clone()).collect();
    let mut pending: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
    let mut merged: Vec<Cluster> = Vec::with_capacity(max_clusters);

    for i in 0..pending.len() {
        if merged.len() >= max_clusters {
            break;
        }
        let Some(mut current) = pending[i].take() else {
            continue;
        };

        for j in (i + 1)..pending.len() {
            if pending[j].is_some() && are_similar(&names[i], &names[j], threshold) {
                if let Some(other) = pending[j].take() {
                    current.absorb(other);
                }
            }
        }

        merged.push(current);
    }

    let leftovers: Vec<Cluster> = pending.into_iter().flatten().collect();
    if let Some(last) = merged.last_mut() {
        for cluster in leftovers {
            last.extend_items(cluster.into_items());
        }
    }

    info!(before, after = merged.len(), "Merged similar clusters");
    merged
}
