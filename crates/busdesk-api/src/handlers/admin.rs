//! Generic proxy handlers for `/api/admin/:resource`

use crate::error::{ApiError, ApiResult};
use crate::extractors::ListParams;
use crate::handlers::routes::search_routes;
use crate::middleware::auth::AdminToken;
use crate::state::AppState;
use crate::upstream::Relayed;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use busdesk_core::{AdminResource, ApiEnvelope};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Turn a relayed upstream answer into a response
///
/// Bodies are passed through verbatim; an empty upstream body becomes a bare
/// success envelope.
pub fn relay(relayed: Relayed) -> Response {
    if relayed.body.is_null() {
        let status = if relayed.status == StatusCode::NO_CONTENT {
            StatusCode::OK
        } else {
            relayed.status
        };
        let envelope = ApiEnvelope::<Value> {
            success: true,
            data: None,
            pagination: None,
            error: None,
            message: None,
        };
        return (status, Json(envelope)).into_response();
    }
    (relayed.status, Json(relayed.body)).into_response()
}

fn parse_resource(segment: &str) -> ApiResult<AdminResource> {
    segment.parse::<AdminResource>().map_err(ApiError::from)
}

fn item_path(resource: AdminResource, id: &str) -> String {
    format!("{}/{}", resource.upstream_path(), urlencoding::encode(id))
}

/// `GET /api/admin/:resource`
#[instrument(skip_all, fields(resource = %resource, page = params.page, limit = params.limit))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    token: AdminToken,
    params: ListParams,
) -> ApiResult<Response> {
    let resource = parse_resource(&resource)?;

    if resource == AdminResource::Routes && params.search.is_some() {
        return search_routes(&state, &params, token.as_deref())
            .await
            .map(IntoResponse::into_response);
    }

    let query = serde_urlencoded::to_string(params.passthrough())
        .map_err(|e| ApiError::Internal(format!("Failed to encode query: {e}")))?;
    debug!(%query, "passing list request through");
    let relayed = state
        .upstream
        .forward(Method::GET, resource.upstream_path(), &query, token.as_deref(), None)
        .await?;
    Ok(relay(relayed))
}

/// `POST /api/admin/:resource`
#[instrument(skip_all, fields(resource = %resource))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    token: AdminToken,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let resource = parse_resource(&resource)?;
    let Json(body) = body?;
    let relayed = state
        .upstream
        .forward(Method::POST, resource.upstream_path(), "", token.as_deref(), Some(&body))
        .await?;
    Ok(relay(relayed))
}

/// `GET /api/admin/:resource/:id`
#[instrument(skip_all, fields(resource = %resource, id = %id))]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, String)>,
    token: AdminToken,
) -> ApiResult<Response> {
    forward_item(&state, Method::GET, &resource, &id, token.as_deref(), None).await
}

/// `PATCH /api/admin/:resource/:id`
#[instrument(skip_all, fields(resource = %resource, id = %id))]
pub async fn patch(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, String)>,
    token: AdminToken,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    forward_item(&state, Method::PATCH, &resource, &id, token.as_deref(), Some(&body)).await
}

/// `PUT /api/admin/:resource/:id`
#[instrument(skip_all, fields(resource = %resource, id = %id))]
pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, String)>,
    token: AdminToken,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    forward_item(&state, Method::PUT, &resource, &id, token.as_deref(), Some(&body)).await
}

/// `DELETE /api/admin/:resource/:id`
#[instrument(skip_all, fields(resource = %resource, id = %id))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((resource, id)): Path<(String, String)>,
    token: AdminToken,
) -> ApiResult<Response> {
    forward_item(&state, Method::DELETE, &resource, &id, token.as_deref(), None).await
}

async fn forward_item(
    state: &AppState,
    method: Method,
    resource: &str,
    id: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> ApiResult<Response> {
    let resource = parse_resource(resource)?;
    let relayed = state
        .upstream
        .forward(method, &item_path(resource, id), "", token, body)
        .await?;
    Ok(relay(relayed))
}
