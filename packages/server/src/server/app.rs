use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use clustering::{Clusterer, ClusteringConfig, Oracle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::routes::{cluster_handler, extract_fields_handler, health_handler};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub clusterer: Arc<Clusterer<Arc<dyn Oracle>>>,
}

impl AppState {
    pub fn new(oracle: Arc<dyn Oracle>, config: ClusteringConfig) -> Self {
        Self {
            clusterer: Arc::new(Clusterer::with_config(oracle, config)),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cluster", post(cluster_handler))
        .route("/extract-fields", post(extract_fields_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
