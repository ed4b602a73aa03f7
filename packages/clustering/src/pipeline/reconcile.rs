//! Reconcile oracle output into a total partition of a batch.
//!
//! The oracle's payload is untrusted free text. Decoding either yields a
//! [`Proposal`] or a `Decode` error; reconciling a proposal never fails and
//! always covers every item exactly once.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClusteringError, Result};
use crate::types::{
    cluster::Cluster,
    proposal::{Proposal, ProposedCluster},
    record::{NormalizedItem, Record},
};

/// Name of the catch-all cluster for unclaimed items.
pub const OTHER_ITEMS_NAME: &str = "Other Items";

/// Reasoning attached to the catch-all cluster.
pub const OTHER_ITEMS_REASONING: &str = "Items that did not fit into other clusters";

const UNNAMED_CLUSTER: &str = "Unnamed Cluster";
const NO_REASONING: &str = "No reasoning provided";

/// Oracle response wrapped in an object.
#[derive(Debug, Clone, Deserialize)]
pub struct AIProposalResponse {
    #[serde(default)]
    pub clusters: Vec<AIProposedCluster>,
}

/// A cluster as the oracle wrote it.
#[derive(Debug, Clone, Deserialize)]
pub struct AIProposedCluster {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub item_indices: Vec<Value>,
}

impl From<AIProposedCluster> for ProposedCluster {
    fn from(raw: AIProposedCluster) -> Self {
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_CLUSTER.to_string());
        let reasoning = raw.reasoning.unwrap_or_else(|| NO_REASONING.to_string());

        let total = raw.item_indices.len();
        let indices: Vec<i64> = raw.item_indices.iter().filter_map(as_index).collect();
        if indices.len() < total {
            debug!(
                cluster = %name,
                dropped = total - indices.len(),
                "Ignoring non-integer item indices"
            );
        }

        ProposedCluster::new(name)
            .with_reasoning(reasoning)
            .with_indices(indices)
    }
}

fn as_index(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Remove Markdown code fences and surrounding whitespace.
pub fn strip_decoration(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = match trimmed.strip_prefix("```") {
        // Drop the language tag, e.g. ```json
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        None => trimmed,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// The span from the first `{`/`[` to the last `}`/`]`, if any.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let end = text.rfind(|c: char| c == '}' || c == ']')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode a raw oracle payload into a proposal.
///
/// Accepts `{"clusters": [...]}` or a bare array of clusters, optionally
/// wrapped in code fences or prose.
pub fn decode_proposal(raw: &str) -> Result<Proposal> {
    let body = strip_decoration(raw);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(first) => json_span(body)
            .and_then(|span| serde_json::from_str(span).ok())
            .ok_or_else(|| ClusteringError::decode(first.to_string()))?,
    };

    let clusters: Vec<AIProposedCluster> = match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| ClusteringError::decode(e.to_string()))?
        }
        Value::Object(_) => serde_json::from_value::<AIProposalResponse>(value)
            .map(|r| r.clusters)
            .map_err(|e| ClusteringError::decode(e.to_string()))?,
        other => {
            return Err(ClusteringError::decode(format!(
                "expected an object or array, got {}",
                kind(&other)
            )))
        }
    };

    Ok(Proposal::new(clusters.into_iter().map(ProposedCluster::from)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn a proposal into a total, disjoint partition of `items`.
///
/// Clusters claim in-range, unclaimed indices in proposal order, so the
/// first cluster to name an index keeps it. Clusters left empty are
/// dropped. Everything unclaimed goes into one trailing
/// [`OTHER_ITEMS_NAME`] cluster.
pub fn reconcile(proposal: &Proposal, items: &[NormalizedItem<'_>]) -> Vec<Cluster> {
    let mut claimed = vec![false; items.len()];
    let mut clusters = Vec::with_capacity(proposal.len() + 1);
    let mut anomalies = 0usize;

    for proposed in &proposal.clusters {
        let mut members: Vec<Record> = Vec::new();
        for &index in &proposed.item_indices {
            match usize::try_from(index).ok().filter(|&i| i < items.len()) {
                Some(i) if !claimed[i] => {
                    claimed[i] = true;
                    members.push(items[i].record.clone());
                }
                _ => anomalies += 1,
            }
        }

        if members.is_empty() {
            debug!(cluster = %proposed.name, "Dropping cluster with no claimable items");
            continue;
        }
        clusters.push(Cluster::new(&proposed.name, &proposed.reasoning, members));
    }

    let unclaimed: Vec<Record> = items
        .iter()
        .zip(&claimed)
        .filter(|(_, taken)| !**taken)
        .map(|(item, _)| item.record.clone())
        .collect();

    if anomalies > 0 || !unclaimed.is_empty() {
        debug!(
            anomalies,
            unclaimed = unclaimed.len(),
            "Resolved assignment anomalies"
        );
    }

    if !unclaimed.is_empty() {
        clusters.push(Cluster::new(
            OTHER_ITEMS_NAME,
            OTHER_ITEMS_REASONING,
            unclaimed,
        ));
    }

    clusters
}

/// Decode and reconcile in one step.
pub fn reconcile_response(raw: &str, items: &[NormalizedItem<'_>]) -> Result<Vec<Cluster>> {
    let proposal = decode_proposal(raw)?;
    Ok(reconcile(&proposal, items))
}
