//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the clustering library
//! without making real model calls.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::error::{ClusteringError, Result};
use crate::pipeline::prompts::format_cluster_prompt;
use crate::traits::oracle::{Oracle, OracleRequest};
use crate::types::record::scalar_to_string;

type ReplyFn = dyn Fn(&OracleRequest<'_, '_>) -> Result<String> + Send + Sync;
type DelayFn = dyn Fn(&OracleRequest<'_, '_>) -> Duration + Send + Sync;

/// How the mock answers.
#[derive(Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
    Hang,
    Func(Arc<ReplyFn>),
    GroupBy(String),
}

/// A mock oracle for testing.
///
/// Answers deterministically and records every call for assertions.
#[derive(Clone)]
pub struct MockOracle {
    behavior: Behavior,

    /// Artificial latency before answering
    delay: Option<Arc<DelayFn>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockOracleCall>>>,
}

/// Record of a call made to the mock oracle.
#[derive(Debug, Clone)]
pub struct MockOracleCall {
    pub instruction: String,
    pub entity_type: String,
    pub item_count: usize,
    /// Request position of the batch's first item
    pub first_position: Option<usize>,
    /// The prompt an LLM-backed oracle would have been sent
    pub prompt: String,
}

impl MockOracle {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always answer with `payload`.
    pub fn replying(payload: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(payload.into()))
    }

    /// Always fail with an oracle error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Never answer within any reasonable timeout.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    /// Answer with a closure over the request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&OracleRequest<'_, '_>) -> Result<String> + Send + Sync + 'static,
    {
        Self::with_behavior(Behavior::Func(Arc::new(f)))
    }

    /// Group items by the value of one normalized attribute.
    ///
    /// Items without the attribute are left out of the proposal.
    pub fn grouping_by(attribute: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::GroupBy(attribute.into()))
    }

    /// Wait `delay` before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_by(move |_| delay)
    }

    /// Wait a per-request latency before answering.
    pub fn with_delay_by<F>(mut self, f: F) -> Self
    where
        F: Fn(&OracleRequest<'_, '_>) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Arc::new(f));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockOracleCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn group_payload(attribute: &str, request: &OracleRequest<'_, '_>) -> String {
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, item) in request.items.iter().enumerate() {
            if let Some(value) = item.attribute(attribute) {
                groups.entry(scalar_to_string(value)).or_default().push(index);
            }
        }

        let clusters: Vec<_> = groups
            .into_iter()
            .map(|(value, indices)| {
                json!({
                    "name": value,
                    "reasoning": format!("Shared {attribute}"),
                    "item_indices": indices,
                })
            })
            .collect();
        json!({ "clusters": clusters }).to_string()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn classify(&self, request: &OracleRequest<'_, '_>) -> Result<String> {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockOracleCall {
                instruction: request.instruction.to_string(),
                entity_type: request.entity_type.to_string(),
                item_count: request.len(),
                first_position: request.items.first().map(|item| item.position),
                prompt: format_cluster_prompt(request),
            });

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(request)).await;
        }

        match &self.behavior {
            Behavior::Reply(payload) => Ok(payload.clone()),
            Behavior::Fail(message) => Err(ClusteringError::Oracle(message.clone().into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ClusteringError::Oracle("mock oracle woke up".into()))
            }
            Behavior::Func(f) => f(request),
            Behavior::GroupBy(attribute) => Ok(Self::group_payload(attribute, request)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{NormalizedItem, Record};

    #[tokio::test]
    async fn test_grouping_by_attribute() {
        let records: Vec<Record> = (0..3).map(|i| json!({"id": i})).collect();
        let items = vec![
            NormalizedItem::new(&records[0], 0).with_attribute("genre", "Drama"),
            NormalizedItem::new(&records[1], 1).with_attribute("genre", "Comedy"),
            NormalizedItem::new(&records[2], 2).with_attribute("genre", "Drama"),
        ];
        let request = OracleRequest {
            items: &items,
            instruction: "by genre",
            entity_type: "movie",
            guidance: "",
        };
        let oracle = MockOracle::grouping_by("genre");

        let payload = oracle.classify(&request).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["clusters"][0]["name"], "Drama");
        assert_eq!(value["clusters"][0]["item_indices"], json!([0, 2]));
        assert_eq!(value["clusters"][1]["item_indices"], json!([1]));

        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].item_count, 3);
        assert_eq!(calls[0].first_position, Some(0));
    }

    #[tokio::test]
    async fn test_failing_oracle() {
        let oracle = MockOracle::failing("rate limited");
        let items: Vec<NormalizedItem<'_>> = Vec::new();
        let request = OracleRequest {
            items: &items,
            instruction: "x",
            entity_type: "",
            guidance: "",
        };

        let err = oracle.classify(&request).await.unwrap_err();
        assert!(matches!(err, ClusteringError::Oracle(_)));

        oracle.clear_calls();
        assert!(oracle.calls().is_empty());
    }
}
