//! Proxy handlers for `/api/admin/settings/:section`

use crate::error::{ApiError, ApiResult};
use crate::handlers::admin::relay;
use crate::middleware::auth::AdminToken;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use busdesk_core::SettingsSection;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

fn section_path(section: &str) -> ApiResult<String> {
    let section = section.parse::<SettingsSection>().map_err(ApiError::from)?;
    Ok(format!("settings/{}", section.as_segment()))
}

/// `GET /api/admin/settings/:section`
#[instrument(skip_all, fields(section = %section))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
    token: AdminToken,
) -> ApiResult<Response> {
    let path = section_path(&section)?;
    let relayed = state
        .upstream
        .forward(Method::GET, &path, "", token.as_deref(), None)
        .await?;
    Ok(relay(relayed))
}

/// `PUT /api/admin/settings/:section`
#[instrument(skip_all, fields(section = %section))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(section): Path<String>,
    token: AdminToken,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let path = section_path(&section)?;
    let Json(body) = body?;
    let relayed = state
        .upstream
        .forward(Method::PUT, &path, "", token.as_deref(), Some(&body))
        .await?;
    Ok(relay(relayed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_path() {
        assert_eq!(section_path("branding").expect("path"), "settings/branding");
        assert_eq!(
            section_path("colors").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }
}
