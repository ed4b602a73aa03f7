use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use clustering::FieldExtractionRequest;

use crate::server::app::AppState;

/// Diagnostic view of normalization and attribute frequencies.
///
/// Read-only; never calls the oracle.
pub async fn extract_fields_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<FieldExtractionRequest>,
) -> Response {
    let report = state.clusterer.extract_fields(&request);
    tracing::debug!(items = report.total_items, "Extracted fields");
    Json(&report).into_response()
}
