//! Instruction-Driven Clustering Library
//!
//! Groups arbitrary, heterogeneous records into named clusters according to
//! a free-form instruction ("group by director", "cluster by industry"). An
//! external oracle proposes the grouping; this library does everything
//! around it.
//!
//! # Design Philosophy
//!
//! **"The oracle proposes, the pipeline guarantees"**
//!
//! - Every input record lands in exactly one output cluster
//! - Oracle output is untrusted: anomalies are absorbed, never propagated
//! - Oracle failure degrades to a fallback cluster, never to a lost request
//! - Library handles mechanics, the oracle handles semantics
//!
//! # Usage
//!
//! ```rust,ignore
//! use clustering::{Clusterer, ClusterRequest};
//! use clustering::testing::MockOracle;
//!
//! let clusterer = Clusterer::new(MockOracle::grouping_by("director"));
//! let request = ClusterRequest::new("webset-1", records, "group by director");
//! let response = clusterer.cluster(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The `Oracle` abstraction
//! - [`types`] - Records, clusters, requests and configuration
//! - [`profiles`] - Built-in entity-type profiles (movie, company, book)
//! - [`pipeline`] - Normalize, batch, reconcile, merge, fallback
//! - [`testing`] - Mock oracle for testing

pub mod error;
pub mod pipeline;
pub mod profiles;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ClusteringError, Result};
pub use profiles::{EntityTypeProfile, ProfileStore, BOOK, COMPANY, MOVIE};
pub use traits::oracle::{Oracle, OracleRequest};
pub use types::{
    analysis::FieldAnalysis,
    cluster::Cluster,
    config::ClusteringConfig,
    proposal::{Proposal, ProposedCluster},
    record::{AttributeMap, NormalizedItem, Record},
    request::{
        ClusterRequest, ClusterResponse, FieldExtractionReport, FieldExtractionRequest,
    },
};

// Re-export the Clusterer from pipeline
pub use pipeline::Clusterer;

#[cfg(feature = "openai")]
pub use ai::OpenAiOracle;

// Re-export testing utilities
pub use testing::MockOracle;
