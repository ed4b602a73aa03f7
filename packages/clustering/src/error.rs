//! Typed errors for the clustering library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Every oracle-side failure (transport, timeout, undecodable payload) is
//! absorbed by the fallback cluster; only validation and configuration
//! errors reach the caller.
//!
//! Index anomalies in oracle output (out-of-range or duplicate claims) are
//! not errors: the reconciler absorbs them into the catch-all cluster.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during clustering operations.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// Request rejected before entering the pipeline
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    /// Oracle unavailable or failed (transport/model error)
    #[error("oracle error: {0}")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Oracle did not answer within the configured bound
    #[error("oracle timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    /// Oracle payload could not be decoded into a proposal
    #[error("failed to decode oracle response: {reason}")]
    Decode { reason: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl ClusteringError {
    /// Shorthand for a validation failure.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a decode failure.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}

/// Result type alias for clustering operations.
pub type Result<T> = std::result::Result<T, ClusteringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = ClusteringError::validation("No items provided for clustering");
        assert_eq!(err.to_string(), "invalid request: No items provided for clustering");
    }

    #[test]
    fn test_timeout_message() {
        let err = ClusteringError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "oracle timed out after 1500ms");
    }
}
