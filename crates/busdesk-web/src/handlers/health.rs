//! Liveness endpoint

use axum::response::Json;
use serde_json::{Value, json};

/// Health check for the web front
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "busdesk-web",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
