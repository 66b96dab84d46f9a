//! Admin token resolution for proxied requests

use crate::{error::ApiError, state::AppState};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use busdesk_core::utils;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bearer token forwarded to the upstream for this request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminToken(pub Option<String>);

impl AdminToken {
    /// Token as a string slice
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// Token the caller presented, from the bearer header or the admin cookie
#[must_use]
pub fn presented_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    utils::presented_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
        cookie_name,
    )
}

/// Decide which token accompanies the request upstream
///
/// # Errors
///
/// [`ApiError::Unauthorized`] when admin access is required and the caller
/// presented no token.
pub fn resolve_token(state: &AppState, headers: &HeaderMap) -> Result<AdminToken, ApiError> {
    if let Some(token) = presented_token(headers, &state.config.security.admin_cookie) {
        debug!("Using caller-supplied admin token");
        return Ok(AdminToken(Some(token.to_string())));
    }

    if state.config.security.require_admin {
        warn!("Admin request without a token");
        return Err(ApiError::Unauthorized("Not authorized, no token".to_string()));
    }

    Ok(AdminToken(state.upstream.service_token().map(str::to_string)))
}

/// Middleware that resolves the admin token and stores it in request extensions
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_token(&state, request.headers()) {
        Ok(token) => {
            request.extensions_mut().insert(token);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use busdesk_core::Config;
    use pretty_assertions::assert_eq;

    fn state(require_admin: bool, service_token: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.security.require_admin = require_admin;
        config.upstream.token = service_token.map(str::to_string);
        AppState::new(config).expect("state")
    }

    #[test]
    fn test_header_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer hdr"));
        headers.insert(header::COOKIE, HeaderValue::from_static("admin_token=ck"));

        let token = resolve_token(&state(true, None), &headers).expect("token");
        assert_eq!(token, AdminToken(Some("hdr".to_string())));
    }

    #[test]
    fn test_cookie_token_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; admin_token=ck"));

        let token = resolve_token(&state(true, None), &headers).expect("token");
        assert_eq!(token.as_deref(), Some("ck"));
    }

    #[test]
    fn test_missing_token_is_unauthorized_when_required() {
        let err = resolve_token(&state(true, Some("svc")), &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_service_token_used_when_not_required() {
        let token = resolve_token(&state(false, Some("svc")), &HeaderMap::new()).expect("token");
        assert_eq!(token.as_deref(), Some("svc"));

        let token = resolve_token(&state(false, None), &HeaderMap::new()).expect("token");
        assert_eq!(token, AdminToken(None));
    }

    #[test]
    fn test_malformed_authorization_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert(header::COOKIE, HeaderValue::from_static("admin_token=ck"));

        assert_eq!(presented_token(&headers, "admin_token"), Some("ck"));
    }
}
