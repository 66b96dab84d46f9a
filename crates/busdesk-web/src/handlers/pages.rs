//! Server-rendered admin pages

use crate::api_client::ListQuery;
use crate::components::html::{APPLY_SELECTION, ListTable, TOGGLE_PAGE, TableLinks};
use crate::pages::layout::{CANCEL, CONFIRM, ConfirmPanel, Notices, PENDING_FIELD};
use crate::pages::{BulkCommand, ListPage, render_document};
use crate::state::AppState;
use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use busdesk_core::AdminResource;
use busdesk_core::config::WebConfig;
use busdesk_core::utils::{normalize_search, presented_token};
use leptos::prelude::*;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Form field naming the button that submitted the list form
pub const ACTION_FIELD: &str = "action";
/// Form field carrying one selected id
pub const SELECTED_FIELD: &str = "selected";

const RESERVED_FIELDS: [&str; 6] = [
    "page",
    "limit",
    "search",
    ACTION_FIELD,
    SELECTED_FIELD,
    PENDING_FIELD,
];

/// Token the caller presented, from the bearer header or the admin cookie
#[must_use]
pub fn caller_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    presented_token(
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

/// List query from URL or form pairs
///
/// Page sizes outside the configured options fall back to the default. Every
/// non-empty pair that is not a paging, search or form field is kept as a
/// pass-through filter.
#[must_use]
pub fn list_query(pairs: &[(String, String)], web: &WebConfig) -> ListQuery {
    let mut query = ListQuery::new(1, web.default_limit);
    for (key, value) in pairs {
        match key.as_str() {
            "page" => query.page = value.trim().parse().unwrap_or(1).max(1),
            "limit" => {
                query.limit = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|limit| web.page_size_options.contains(limit))
                    .unwrap_or(web.default_limit);
            }
            "search" => query.search = normalize_search(Some(value)).map(str::to_string),
            reserved if RESERVED_FIELDS.contains(&reserved) => {}
            _ if value.is_empty() => {}
            _ => {
                query.filters.insert(key.clone(), value.clone());
            }
        }
    }
    query
}

fn form_field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let message = message.to_string();
    let body = view! { <p class="error">{message}</p> };
    (status, Html(render_document(title, body))).into_response()
}

fn open_page(
    segment: &str,
    state: &AppState,
    pairs: &[(String, String)],
) -> Result<ListPage, Response> {
    let Ok(resource) = segment.parse::<AdminResource>() else {
        return Err(error_page(
            StatusCode::NOT_FOUND,
            "Not found",
            "No such admin page.",
        ));
    };
    let web = &state.config.web;
    ListPage::new(resource, web)
        .map(|page| page.with_query(list_query(pairs, web)))
        .map_err(|e| {
            error!(%resource, error = %e, "Failed to build list page");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "The page could not be built.",
            )
        })
}

fn render_list(mut page: ListPage) -> Response {
    let resource = page.resource();
    let links = TableLinks::new(
        format!("/admin/{}", resource.as_segment()),
        page.query().clone(),
    );
    let notices = page.take_notices();
    let confirm = page.pending().cloned().map(|pending| {
        view! {
            <ConfirmPanel
                pending=pending
                resource=resource
                action=links.bulk()
                state=links.state()
            />
        }
    });
    let table = page.view();

    let body = view! {
        <Notices notices=notices/>
        {confirm}
        <ListTable table=table links=links/>
    };
    Html(render_document(resource.title(), body)).into_response()
}

/// Admin index listing every resource
pub async fn index() -> Html<String> {
    let items = AdminResource::ALL
        .iter()
        .map(|resource| {
            let href = format!("/admin/{}", resource.as_segment());
            view! { <li><a href=href>{resource.title()}</a></li> }
        })
        .collect::<Vec<_>>();
    Html(render_document(
        "Dashboard",
        view! { <ul class="resources">{items}</ul> },
    ))
}

/// List page for one resource
#[instrument(skip_all)]
pub async fn list_page(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let mut page = match open_page(&resource, &state, &params) {
        Ok(page) => page,
        Err(response) => return response,
    };

    let client = state.client_for(caller_token(&headers, &state.config.security.admin_cookie));
    page.refresh(&client).await;
    render_list(page)
}

/// Submission of the list form: selection changes and bulk actions
///
/// The checked boxes replace the selection first. A bulk command only stages
/// its confirmation; the action runs when the confirmation form comes back
/// with `action=confirm`.
#[instrument(skip_all)]
pub async fn bulk_action(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let mut page = match open_page(&resource, &state, &fields) {
        Ok(page) => page,
        Err(response) => return response,
    };
    let client = state.client_for(caller_token(&headers, &state.config.security.admin_cookie));

    page.set_selection(
        fields
            .iter()
            .filter(|(key, _)| key == SELECTED_FIELD)
            .map(|(_, id)| id.clone())
            .collect(),
    );
    let action = form_field(&fields, ACTION_FIELD).unwrap_or(APPLY_SELECTION);
    debug!(action, selected = page.selected().len(), "list form submitted");

    if action == CONFIRM {
        let Some(command) = form_field(&fields, PENDING_FIELD)
            .and_then(|pending| pending.parse::<BulkCommand>().ok())
        else {
            return error_page(StatusCode::BAD_REQUEST, "Bad request", "Nothing to confirm.");
        };
        if page.request(&command).is_some() {
            page.confirm(&client).await;
        } else {
            page.refresh(&client).await;
        }
        return render_list(page);
    }

    let command = match action {
        APPLY_SELECTION | TOGGLE_PAGE | CANCEL => None,
        other => match other.parse::<BulkCommand>() {
            Ok(command) => Some(command),
            Err(e) => return error_page(StatusCode::BAD_REQUEST, "Bad request", &e),
        },
    };

    page.refresh(&client).await;
    if let Some(command) = command {
        page.request(&command);
    } else if action == TOGGLE_PAGE {
        page.toggle_all();
    }
    render_list(page)
}
