use axum::{extract::Extension, Json};
use clustering::{ClusterRequest, ClusterResponse};

use crate::server::{app::AppState, error::ApiError};

/// Cluster the posted records by the posted instruction.
pub async fn cluster_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ClusterRequest>,
) -> Result<Json<ClusterResponse>, ApiError> {
    let response = state.clusterer.cluster(&request).await?;
    Ok(Json(response))
}
