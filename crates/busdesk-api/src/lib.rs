//! Admin proxy in front of the upstream ticketing API
//!
//! Every `/api/admin/*` request is forwarded upstream with the admin bearer
//! token attached; `GET /api/admin/routes?search=` is answered locally from
//! a full fetch of the upstream routes.

#![forbid(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use busdesk_core::Config;
use busdesk_core::context_error::Result;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the upstream client
/// cannot be built.
pub fn build_router(config: Config) -> Result<Router> {
    let state = Arc::new(AppState::new(config)?);
    let request_timeout = Duration::from_secs(state.config.security.request_timeout);
    let cors = middleware::cors::cors_layer(&state.config.api);

    let mut router = Router::new()
        .merge(routes::admin_routes(Arc::clone(&state)))
        .merge(routes::health_routes())
        .with_state(Arc::clone(&state))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    Ok(router)
}
