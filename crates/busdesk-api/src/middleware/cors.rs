//! CORS policy built from the API configuration

use axum::http::{HeaderName, HeaderValue, Method, header, request::Parts};
use busdesk_core::config::ApiConfig;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Check if the given origin is allowed by the configured origins
///
/// Supports `*`, exact matches and `*.domain` subdomain patterns.
#[must_use]
pub fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|allowed| {
        if allowed == "*" || allowed == origin {
            return true;
        }
        allowed
            .strip_prefix("*.")
            .is_some_and(|domain| origin.ends_with(&format!(".{domain}")))
    })
}

/// CORS layer for the proxy, or `None` when CORS is disabled
#[must_use]
pub fn cors_layer(api: &ApiConfig) -> Option<CorsLayer> {
    if !api.enable_cors {
        return None;
    }

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [
        header::ACCEPT,
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        HeaderName::from_static("x-request-id"),
    ];
    let layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(86_400));

    if api.cors_origins.iter().any(|origin| origin == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins = api.cors_origins.clone();
    Some(
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin
                        .to_str()
                        .is_ok_and(|origin| is_origin_allowed(origin, &origins))
                },
            )),
    )
}
