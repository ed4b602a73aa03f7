use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clustering::ClusteringError;
use serde_json::json;

/// Request-level failure, rendered as `{ "detail": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Clustering failed: {0}")]
    Internal(String),
}

impl From<ClusteringError> for ApiError {
    fn from(error: ClusteringError) -> Self {
        match error {
            ClusteringError::Validation { reason } => Self::BadRequest(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let error = ApiError::from(ClusteringError::validation("No items provided for clustering"));
        assert_eq!(error.to_string(), "No items provided for clustering");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        let error = ApiError::from(ClusteringError::Config("no profiles".into()));
        assert_eq!(error.to_string(), "Clustering failed: config error: no profiles");
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
