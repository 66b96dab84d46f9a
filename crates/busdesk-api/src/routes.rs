//! API route definitions

use crate::middleware::auth::require_admin;
use crate::{handlers, state::AppState};
use axum::{Router, middleware, routing::get};
use std::sync::Arc;

/// Admin proxy routes, all behind the admin token middleware
pub fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/settings/:section",
            get(handlers::settings::show).put(handlers::settings::update),
        )
        .route(
            "/api/admin/:resource",
            get(handlers::admin::list).post(handlers::admin::create),
        )
        .route(
            "/api/admin/:resource/:id",
            get(handlers::admin::show)
                .patch(handlers::admin::patch)
                .put(handlers::admin::replace)
                .delete(handlers::admin::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Health check routes (no token required)
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}
