//! Oracle trait for the external classifier.
//!
//! The oracle is the one fallible, slow collaborator of the pipeline: given
//! a batch and an instruction it proposes a grouping. Any classifier that
//! answers with the proposal JSON shape can stand in for it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::record::NormalizedItem;

/// Everything the oracle needs to classify one batch.
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'r, 'a> {
    /// Items, addressed by batch-local index (position in this slice)
    pub items: &'r [NormalizedItem<'a>],

    /// The caller's grouping instruction
    pub instruction: &'r str,

    /// Resolved entity type name
    pub entity_type: &'r str,

    /// Domain guidance text for the entity type
    pub guidance: &'r str,
}

impl<'r, 'a> OracleRequest<'r, 'a> {
    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// External classification capability.
///
/// Implementations wrap a specific provider (OpenAI, a local model, a rules
/// engine) and return the provider's raw textual payload. Decoding and
/// validation happen in [`crate::pipeline::reconcile`], so implementations
/// should not try to repair the payload themselves.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Propose a grouping for the batch.
    ///
    /// Expected payload: `{"clusters": [{"name", "reasoning", "item_indices"}]}`.
    /// Errors are OracleFailures and are recovered by the caller.
    async fn classify(&self, request: &OracleRequest<'_, '_>) -> Result<String>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn classify(&self, request: &OracleRequest<'_, '_>) -> Result<String> {
        (**self).classify(request).await
    }
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Box<T> {
    async fn classify(&self, request: &OracleRequest<'_, '_>) -> Result<String> {
        (**self).classify(request).await
    }
}
