use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::json;
use tipsync_protocol::elements;

use crate::service::SyncService;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(service): State<Arc<SyncService>>) -> Json<serde_json::Value> {
    let policy = service.policy();
    Json(json!({
        "name": "tipsync-server",
        "version": env!("CARGO_PKG_VERSION"),
        "stanzas": [elements::SYNC_PULL, elements::SYNC_PUSH],
        "verify_start_tip": policy.verify_start_tip,
        "max_payload_size": policy.max_payload_size,
        "sessions_opened": service.sessions_opened(),
    }))
}
