//! Clustering pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Normalization (flatten records, resolve query-relevant attributes)
//! - Batch planning for large inputs
//! - Oracle classification with a per-call timeout
//! - Reconciliation of the oracle's proposal into a partition
//! - Fallback when the oracle fails or answers garbage
//! - Merging of similar clusters across batches

pub mod analyze;
pub mod batch;
pub mod engine;
pub mod fallback;
pub mod merge;
pub mod normalize;
pub mod prompts;
pub mod reconcile;

pub use analyze::{analyze_fields, recommend_fields};
pub use batch::{plan, Batch};
pub use engine::Clusterer;
pub use fallback::{fallback_cluster, FallbackScope, ALL_ITEMS_NAME};
pub use merge::{are_similar, merge_similar_clusters, name_similarity};
pub use normalize::{
    attribute_names, detect_entity_type, extract, flatten, infer_relevant_attributes,
    resolve_attribute, resolve_profile,
};
pub use prompts::{format_cluster_prompt, CLUSTER_PROMPT, CLUSTER_SYSTEM_PROMPT};
pub use reconcile::{
    decode_proposal, reconcile, reconcile_response, strip_decoration, AIProposalResponse,
    AIProposedCluster, OTHER_ITEMS_NAME, OTHER_ITEMS_REASONING,
};
