//! List page controller: owns the query, the rows and the selection for one
//! admin resource and drives the data table.
//!
//! Every fetch takes a [`FetchTicket`] stamped with a generation number. A
//! response is applied only when its ticket is still the latest one issued,
//! so a slow response can never overwrite the result of a newer query.

use super::resources;
use crate::api_client::{ApiClient, ClientResult, ListData, ListQuery};
use crate::components::{
    DataTable, PageIntent, SelectionSet, TableError, TableEvent, TableListener, TableProps,
    TableView,
};
use busdesk_core::config::WebConfig;
use busdesk_core::{AdminResource, PaginationState};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// An action completed
    Success,
    /// An action failed
    Error,
}

impl NoticeLevel {
    /// CSS modifier of the toast
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Toast message shown above the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Bulk action named by the list form, `delete` or `status:<status>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkCommand {
    /// Delete the selected records
    Delete,
    /// Set `status` on the selected records
    SetStatus(String),
}

impl fmt::Display for BulkCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => f.write_str("delete"),
            Self::SetStatus(status) => write!(f, "status:{status}"),
        }
    }
}

impl FromStr for BulkCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "delete" {
            return Ok(Self::Delete);
        }
        s.strip_prefix("status:")
            .filter(|status| resources::BULK_STATUSES.contains(status))
            .map(|status| Self::SetStatus(status.to_string()))
            .ok_or_else(|| format!("unknown bulk action '{s}'"))
    }
}

/// Destructive action waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Delete every selected record
    DeleteSelected {
        /// Ids to delete
        ids: Vec<String>,
    },
    /// Set `status` on every selected record
    ChangeStatus {
        /// Ids to update
        ids: Vec<String>,
        /// New status
        status: String,
    },
}

impl Confirmation {
    /// Ids the action applies to
    #[must_use]
    pub fn ids(&self) -> &[String] {
        match self {
            Self::DeleteSelected { ids } | Self::ChangeStatus { ids, .. } => ids,
        }
    }

    /// Command that stages this confirmation again
    #[must_use]
    pub fn command(&self) -> BulkCommand {
        match self {
            Self::DeleteSelected { .. } => BulkCommand::Delete,
            Self::ChangeStatus { status, .. } => BulkCommand::SetStatus(status.clone()),
        }
    }

    /// Question put to the user
    #[must_use]
    pub fn prompt(&self, resource: AdminResource) -> String {
        let noun = resource.title().to_lowercase();
        match self {
            Self::DeleteSelected { ids } => {
                format!("Delete {} {noun}? This cannot be undone.", ids.len())
            }
            Self::ChangeStatus { ids, status } => {
                format!("Mark {} {noun} as {status}?", ids.len())
            }
        }
    }
}

/// Proof that a fetch was started, required to apply its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: ListQuery,
}

impl FetchTicket {
    /// Query the fetch should issue
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// Mutable list state, updated through [`TableListener`] callbacks
#[derive(Debug, Clone)]
pub struct ListState {
    resource: AdminResource,
    query: ListQuery,
    rows: Vec<Value>,
    pagination: Option<PaginationState>,
    loading: bool,
    selected: SelectionSet,
    notices: Vec<Notice>,
    pending: Option<Confirmation>,
    generation: u64,
    stale: bool,
}

impl ListState {
    fn new(resource: AdminResource, query: ListQuery) -> Self {
        Self {
            resource,
            query,
            rows: Vec::new(),
            pagination: None,
            loading: false,
            selected: SelectionSet::new(),
            notices: Vec::new(),
            pending: None,
            generation: 0,
            stale: true,
        }
    }
}

impl TableListener for ListState {
    fn on_page_change(&mut self, page: u32) {
        self.query.page = page;
        self.stale = true;
    }

    fn on_limit_change(&mut self, limit: u32) {
        self.query.limit = limit;
        self.query.page = 1;
        self.stale = true;
    }

    fn on_search(&mut self, term: &str) {
        let term = term.trim();
        self.query.search = (!term.is_empty()).then(|| term.to_string());
        self.query.page = 1;
        self.stale = true;
    }

    fn on_selection_change(&mut self, selected: &SelectionSet) {
        self.selected.clone_from(selected);
    }
}

/// Admin list page for one resource
#[derive(Debug)]
pub struct ListPage {
    table: DataTable<Value>,
    state: ListState,
}

impl ListPage {
    /// Create a page for `resource` using the web configuration
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the resource's column set is invalid.
    pub fn new(resource: AdminResource, config: &WebConfig) -> Result<Self, TableError> {
        let table = resources::table(
            resource,
            config.page_size_options.clone(),
            config.search_debounce(),
        )?;
        Ok(Self {
            table,
            state: ListState::new(resource, ListQuery::new(1, config.default_limit)),
        })
    }

    /// Start from a specific query, e.g. one taken from the URL
    #[must_use]
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.table
            .set_search_value(query.search.clone().unwrap_or_default());
        self.state.query = query;
        self.state.stale = true;
        self
    }

    /// Resource shown by this page
    #[must_use]
    pub const fn resource(&self) -> AdminResource {
        self.state.resource
    }

    /// Current query
    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.state.query
    }

    /// Rows of the current page
    #[must_use]
    pub fn rows(&self) -> &[Value] {
        &self.state.rows
    }

    /// Pagination of the current page
    #[must_use]
    pub const fn pagination(&self) -> Option<PaginationState> {
        self.state.pagination
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Whether the query changed since the last applied fetch
    #[must_use]
    pub const fn needs_refresh(&self) -> bool {
        self.state.stale
    }

    /// Selected ids across all pages
    #[must_use]
    pub const fn selected(&self) -> &SelectionSet {
        &self.state.selected
    }

    /// Confirmation waiting for an answer
    #[must_use]
    pub const fn pending(&self) -> Option<&Confirmation> {
        self.state.pending.as_ref()
    }

    /// Drain the queued notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }

    /// Render the table for the current state
    #[must_use]
    pub fn view(&self) -> TableView {
        self.table.render(&self.props())
    }

    fn props(&self) -> TableProps<'_, Value> {
        TableProps::new(&self.state.rows)
            .loading(self.state.loading)
            .paginated(self.state.pagination)
            .selected(&self.state.selected)
    }

    /// Deliver a table event to the page state
    pub fn handle(&mut self, event: TableEvent) {
        event.dispatch(&mut self.state);
    }

    /// Toggle one row's checkbox
    pub fn toggle_row(&mut self, id: &str) {
        let props = TableProps::new(&self.state.rows).selected(&self.state.selected);
        if let Some(event) = self.table.toggle_row(&props, id) {
            event.dispatch(&mut self.state);
        }
    }

    /// Replace the selection, e.g. with the boxes checked in a submitted form
    pub fn set_selection(&mut self, selected: SelectionSet) {
        self.handle(TableEvent::SelectionChange(selected));
    }

    /// Toggle "select all" for the current page
    pub fn toggle_all(&mut self) {
        let props = TableProps::new(&self.state.rows).selected(&self.state.selected);
        if let Some(event) = self.table.toggle_all(&props) {
            event.dispatch(&mut self.state);
        }
    }

    /// Activate a page-strip button
    pub fn navigate(&mut self, intent: PageIntent) {
        let Some(pagination) = self.state.pagination else {
            return;
        };
        if let Some(event) = self.table.navigate(&pagination, intent) {
            event.dispatch(&mut self.state);
        }
    }

    /// Pick a page size
    pub fn change_limit(&mut self, limit: u32) {
        if let Some(event) = self.table.change_limit(limit) {
            event.dispatch(&mut self.state);
        }
    }

    /// A keystroke in the search box
    pub fn type_search(&mut self, text: &str) {
        self.table.type_search(text);
    }

    /// Wait for the debounced search and apply it
    ///
    /// Returns `false` when there is no search pending.
    pub async fn settle_search(&mut self) -> bool {
        match self.table.next_search().await {
            Some(event) => {
                event.dispatch(&mut self.state);
                true
            }
            None => false,
        }
    }

    /// Set or clear a pass-through filter; resets to page 1
    pub fn set_filter(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                self.state.query.filters.insert(key, value);
            }
            None => {
                self.state.query.filters.remove(&key);
            }
        }
        self.state.query.page = 1;
        self.state.stale = true;
    }

    /// Start a fetch for the current query
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.state.generation += 1;
        self.state.loading = true;
        self.state.stale = false;
        FetchTicket {
            generation: self.state.generation,
            query: self.state.query.clone(),
        }
    }

    /// Apply the result of a fetch
    ///
    /// Returns `false` when the ticket was superseded and the result dropped.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: ClientResult<ListData>) -> bool {
        if ticket.generation != self.state.generation {
            debug!(
                resource = %self.state.resource,
                generation = ticket.generation,
                latest = self.state.generation,
                "dropping stale list response"
            );
            return false;
        }

        self.state.loading = false;
        match result {
            Ok(data) => {
                self.state.rows = data.rows;
                self.state.pagination = data.pagination;
            }
            Err(e) => self.report("Failed to load data", &e),
        }
        true
    }

    /// Fetch the current query and apply the response
    pub async fn refresh(&mut self, client: &ApiClient) -> bool {
        let ticket = self.begin_fetch();
        let result = client.list(self.state.resource, ticket.query()).await;
        self.complete_fetch(ticket, result)
    }

    /// Stage `command` for the selected rows
    pub fn request(&mut self, command: &BulkCommand) -> Option<&Confirmation> {
        match command {
            BulkCommand::Delete => self.request_delete_selected(),
            BulkCommand::SetStatus(status) => {
                if !resources::has_status(self.state.resource) {
                    self.state.notices.push(Notice::new(
                        NoticeLevel::Error,
                        format!("{} have no status to change", self.state.resource.title()),
                    ));
                    return None;
                }
                self.request_status_change(status)
            }
        }
    }

    /// Stage deletion of the selected rows
    pub fn request_delete_selected(&mut self) -> Option<&Confirmation> {
        let ids = self.selected_ids()?;
        self.state.pending = Some(Confirmation::DeleteSelected { ids });
        self.state.pending.as_ref()
    }

    /// Stage a status change for the selected rows
    pub fn request_status_change(&mut self, status: &str) -> Option<&Confirmation> {
        let ids = self.selected_ids()?;
        self.state.pending = Some(Confirmation::ChangeStatus {
            ids,
            status: status.to_string(),
        });
        self.state.pending.as_ref()
    }

    fn selected_ids(&mut self) -> Option<Vec<String>> {
        if self.state.selected.is_empty() {
            self.state
                .notices
                .push(Notice::new(NoticeLevel::Info, "Select at least one row first"));
            return None;
        }
        Some(self.state.selected.iter().cloned().collect())
    }

    /// Discard the staged confirmation
    pub fn cancel(&mut self) {
        self.state.pending = None;
    }

    /// Execute the staged confirmation, then refetch
    ///
    /// Returns `true` when the action succeeded. On a partial failure the
    /// ids already processed leave the selection and the list is refetched
    /// all the same.
    pub async fn confirm(&mut self, client: &ApiClient) -> bool {
        let Some(pending) = self.state.pending.take() else {
            return false;
        };
        let resource = self.state.resource;
        let noun = resource.title().to_lowercase();

        let (result, done) = match &pending {
            Confirmation::DeleteSelected { ids } => (
                client.delete_many(resource, ids).await,
                format!("Deleted {} {noun}", ids.len()),
            ),
            Confirmation::ChangeStatus { ids, status } => (
                client.update_status(resource, ids, status).await,
                format!("Marked {} {noun} as {status}", ids.len()),
            ),
        };

        let succeeded = match result {
            Ok(()) => {
                info!(%resource, action = %done, "bulk action applied");
                self.state.selected.clear();
                self.state.notices.push(Notice::new(NoticeLevel::Success, done));
                true
            }
            Err(e) => {
                warn!(%resource, applied = e.applied.len(), total = e.total, "bulk action stopped early");
                for id in &e.applied {
                    self.state.selected.remove(id);
                }
                self.report("Action failed", &e);
                false
            }
        };
        self.refresh(client).await;
        succeeded
    }

    fn report(&mut self, context: &str, err: &dyn std::error::Error) {
        error!(resource = %self.state.resource, error = %err, "{context}");
        self.state
            .notices
            .push(Notice::new(NoticeLevel::Error, format!("{context}: {err}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ClientError;
    use crate::components::data_table::TableBody;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page() -> ListPage {
        ListPage::new(AdminResource::Routes, &WebConfig::default()).expect("page")
    }

    fn data(ids: &[&str], page: u32, total: u64) -> ListData {
        ListData {
            rows: ids.iter().map(|id| json!({"_id": id, "title": *id})).collect(),
            pagination: Some(PaginationState::new(page, 10, total)),
        }
    }

    fn ids(values: &[&str]) -> SelectionSet {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut page = page();

        let first = page.begin_fetch();
        page.handle(TableEvent::Search("gondar".to_string()));
        let second = page.begin_fetch();

        assert!(page.complete_fetch(second, Ok(data(&["fresh"], 1, 1))));
        assert!(!page.complete_fetch(first, Ok(data(&["old"], 1, 1))));

        assert_eq!(page.rows()[0]["_id"], "fresh");
        assert!(!page.is_loading());
    }

    #[test]
    fn test_loading_view_while_fetching() {
        let mut page = page();
        let _ticket = page.begin_fetch();
        assert!(matches!(page.view().body, TableBody::Skeleton { rows: 5, .. }));
    }

    #[test]
    fn test_limit_and_search_reset_page() {
        let mut page = page();
        page.handle(TableEvent::PageChange(4));
        assert_eq!(page.query().page, 4);

        page.handle(TableEvent::LimitChange(50));
        assert_eq!((page.query().page, page.query().limit), (1, 50));

        page.handle(TableEvent::PageChange(3));
        page.handle(TableEvent::Search("  Hawassa ".to_string()));
        assert_eq!(page.query().page, 1);
        assert_eq!(page.query().search.as_deref(), Some("Hawassa"));
        assert!(page.needs_refresh());
    }

    #[test]
    fn test_selection_persists_across_pages() {
        let mut page = page();
        let ticket = page.begin_fetch();
        page.complete_fetch(ticket, Ok(data(&["a", "b"], 1, 20)));
        page.toggle_row("a");

        page.navigate(PageIntent::Next);
        assert_eq!(page.query().page, 2);
        let ticket = page.begin_fetch();
        page.complete_fetch(ticket, Ok(data(&["c", "d"], 2, 20)));

        assert_eq!(page.selected(), &ids(&["a"]));
        page.toggle_all();
        assert_eq!(page.selected(), &ids(&["a", "c", "d"]));
        assert_eq!(page.view().selected_count, 3);
    }

    #[test]
    fn test_error_becomes_notice() {
        let mut page = page();
        let ticket = page.begin_fetch();
        let applied = page.complete_fetch(
            ticket,
            Err(ClientError::Status {
                status: 502,
                message: "Upstream unavailable".to_string(),
            }),
        );

        assert!(applied);
        let notices = page.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("Upstream unavailable"));
        assert!(page.take_notices().is_empty());
    }

    #[test]
    fn test_request_without_selection_warns() {
        let mut page = page();
        assert!(page.request_delete_selected().is_none());
        assert_eq!(page.take_notices()[0].level, NoticeLevel::Info);
    }

    #[test]
    fn test_cancel_discards_confirmation() {
        let mut page = page();
        let ticket = page.begin_fetch();
        page.complete_fetch(ticket, Ok(data(&["a", "b"], 1, 2)));
        page.toggle_all();

        let prompt = page
            .request_status_change("inactive")
            .map(|c| c.prompt(AdminResource::Routes));
        assert_eq!(prompt.as_deref(), Some("Mark 2 routes as inactive?"));

        page.cancel();
        assert!(page.pending().is_none());
    }

    #[test]
    fn test_filter_resets_page() {
        let mut page = page();
        page.handle(TableEvent::PageChange(5));
        page.set_filter("status", Some("active".to_string()));
        assert_eq!(page.query().page, 1);
        assert_eq!(page.query().filters.get("status").map(String::as_str), Some("active"));

        page.set_filter("status", None);
        assert!(page.query().filters.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_and_confirm_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/routes"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"_id": "r1", "title": "Addis Ababa - Adama"}],
                "pagination": {"page": 1, "limit": 10, "total": 1, "pages": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/routes/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let mut page = page();
        assert!(page.refresh(&client).await);
        assert_eq!(page.rows().len(), 1);

        page.toggle_row("r1");
        assert!(page.request_delete_selected().is_some());
        assert!(page.confirm(&client).await);

        assert!(page.selected().is_empty());
        let notices = page.take_notices();
        assert_eq!(notices[0], Notice::new(NoticeLevel::Success, "Deleted 1 routes"));
    }

    #[tokio::test]
    async fn test_partial_bulk_failure_drops_applied_ids_and_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/routes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"_id": "r1", "title": "Adama"}, {"_id": "r2", "title": "Dessie"}],
                "pagination": {"page": 1, "limit": 10, "total": 2, "pages": 1}
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/routes/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/routes/r2"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let mut page = page();
        page.refresh(&client).await;
        page.toggle_all();
        page.request_delete_selected();

        assert!(!page.confirm(&client).await);
        assert_eq!(page.selected(), &ids(&["r2"]));
        assert!(page.pending().is_none());

        let notices = page.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("1 of 2 applied"), "{}", notices[0].message);
    }

    #[test]
    fn test_bulk_command_parsing() {
        assert_eq!("delete".parse::<BulkCommand>(), Ok(BulkCommand::Delete));
        assert_eq!(
            "status:inactive".parse::<BulkCommand>(),
            Ok(BulkCommand::SetStatus("inactive".to_string()))
        );
        assert!("status:archived".parse::<BulkCommand>().is_err());
        assert!("drop-table".parse::<BulkCommand>().is_err());
        assert_eq!(BulkCommand::SetStatus("active".to_string()).to_string(), "status:active");
    }

    #[test]
    fn test_status_change_needs_status_field() {
        let mut page = ListPage::new(AdminResource::Prices, &WebConfig::default()).expect("page");
        page.set_selection(ids(&["p1"]));

        assert!(page.request(&BulkCommand::SetStatus("active".to_string())).is_none());
        assert_eq!(page.take_notices()[0].level, NoticeLevel::Error);

        let staged = page.request(&BulkCommand::Delete).cloned().expect("staged");
        assert_eq!(staged.ids(), ["p1".to_string()]);
        assert_eq!(staged.command(), BulkCommand::Delete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_updates_query() {
        let mut page = page();
        page.type_search("Bah");
        page.type_search("Bahir");

        assert!(page.settle_search().await);
        assert_eq!(page.query().search.as_deref(), Some("Bahir"));
        assert!(page.needs_refresh());
    }
}
