use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::service::SyncService;

/// Build the axum router with the tipsync status endpoints.
pub fn build_router(service: Arc<SyncService>) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
