//! Route definitions for the web interface

use crate::{
    handlers::{health, pages},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the complete web application router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page routes
        .route("/", get(pages::index))
        .route("/admin/:resource", get(pages::list_page))
        .route("/admin/:resource/bulk", post(pages::bulk_action))
        // Health check
        .route("/health", get(health::health_check))
}
