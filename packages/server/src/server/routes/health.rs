use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    timestamp: DateTime<Utc>,
}

/// Health check endpoint
///
/// Liveness only: the oracle is not called.
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: "clustering-service".to_string(),
            timestamp: Utc::now(),
        }),
    )
}
