//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::Router;
use busdesk_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the complete web application with all routes and state
pub fn build_app(config: Config) -> Router {
    let timeout = Duration::from_secs(config.security.request_timeout);
    let state = Arc::new(AppState::new(config));

    build_routes()
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}
