//! Search mode of `GET /api/admin/routes`
//!
//! The upstream cannot search routes by text, so a search fetches every
//! route in large batches, filters locally and re-paginates the matches.

use crate::error::ApiResult;
use crate::extractors::ListParams;
use crate::state::AppState;
use axum::Json;
use busdesk_core::utils::{contains_ignore_case, paginate};
use busdesk_core::{AdminResource, ApiEnvelope, PaginationState};
use serde_json::Value;
use tracing::info;

/// Fields of a route matched against the search term
pub const SEARCH_FIELDS: [&str; 3] = ["title", "origin", "destination"];

fn field_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text.as_str()),
        // populated references such as `origin: { _id, name }`
        Value::Object(map) => map.get("name").and_then(Value::as_str),
        _ => None,
    }
}

/// Whether any searchable field of `route` contains `term`, ignoring case
#[must_use]
pub fn route_matches(route: &Value, term: &str) -> bool {
    SEARCH_FIELDS.iter().any(|field| {
        route
            .get(field)
            .and_then(field_text)
            .is_some_and(|text| contains_ignore_case(text, term))
    })
}

/// Filter `routes` by `term` and cut out one page of the matches
#[must_use]
pub fn search_page(routes: Vec<Value>, term: &str, page: u32, limit: u32) -> ApiEnvelope<Vec<Value>> {
    let matches: Vec<Value> = routes
        .into_iter()
        .filter(|route| route_matches(route, term))
        .collect();
    let pagination = PaginationState::new(page, limit, matches.len() as u64);
    ApiEnvelope::paginated(paginate(matches, page, limit), pagination)
}

/// Answer a routes list request that carries a search term
///
/// # Errors
///
/// Any upstream failure while walking the batches.
pub async fn search_routes(
    state: &AppState,
    params: &ListParams,
    token: Option<&str>,
) -> ApiResult<Json<ApiEnvelope<Vec<Value>>>> {
    let term = params.search.as_deref().unwrap_or_default();
    let collected = state
        .upstream
        .fetch_all(AdminResource::Routes.upstream_path(), &params.filters, token)
        .await?;

    let envelope = search_page(collected.rows, term, params.page, params.limit);
    info!(
        term,
        batches = collected.batches,
        truncated = collected.truncated,
        matches = envelope.pagination.map_or(0, |p| p.total),
        "route search finished"
    );
    Ok(Json(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn routes() -> Vec<Value> {
        vec![
            json!({"_id": "r1", "title": "Addis Ababa - Gondar", "origin": "Addis Ababa", "destination": "Gondar"}),
            json!({"_id": "r2", "title": "Express 12", "origin": {"_id": "l2", "name": "Hawassa"}, "destination": "Arba Minch"}),
            json!({"_id": "r3", "title": "Bahir Dar - Gondar", "origin": "Bahir Dar", "destination": "Gondar"}),
            json!({"_id": "r4", "title": "Dire Dawa shuttle", "origin": "Dire Dawa", "destination": null}),
        ]
    }

    #[rstest]
    #[case("gondar", &["r1", "r3"])]
    #[case("HAWASSA", &["r2"])]
    #[case("minch", &["r2"])]
    #[case("shuttle", &["r4"])]
    #[case("Mekelle", &[])]
    fn test_route_matches(#[case] term: &str, #[case] expected: &[&str]) {
        let ids: Vec<String> = routes()
            .iter()
            .filter(|route| route_matches(route, term))
            .filter_map(|route| route["_id"].as_str().map(str::to_string))
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_search_page_repaginates_matches() {
        let envelope = search_page(routes(), "gondar", 2, 1);

        assert_eq!(
            envelope.pagination,
            Some(PaginationState {
                page: 2,
                limit: 1,
                total: 2,
                pages: 2
            })
        );
        assert_eq!(envelope.data, Some(vec![routes()[2].clone()]));
    }

    #[test]
    fn test_search_page_past_the_end_is_empty() {
        let envelope = search_page(routes(), "gondar", 5, 10);
        assert_eq!(envelope.data, Some(vec![]));
        assert_eq!(envelope.pagination.map(|p| p.pages), Some(1));
    }
}
