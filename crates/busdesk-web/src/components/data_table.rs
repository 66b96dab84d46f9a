//! Generic paginated, searchable, selectable list renderer
//!
//! [`DataTable`] turns immutable [`TableProps`] into a [`TableView`] and never
//! fetches or filters data itself. User interaction goes through the event
//! methods, which return a [`TableEvent`] for the caller to dispatch to its
//! [`TableListener`].

use super::column::{Cell, Column, ColumnSet, RenderFn, TableRow};
use super::pagination::{DEFAULT_LIMIT_OPTIONS, FooterView, PageIntent, PaginationController};
use super::search::{DEFAULT_SEARCH_DEBOUNCE, SearchDebouncer};
use super::selection::{PageSelection, SelectionSet, SelectionTracker};
use busdesk_core::PaginationState;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Number of placeholder rows shown while loading
pub const SKELETON_ROWS: usize = 5;

/// Callbacks fired by the table; every method defaults to a no-op
pub trait TableListener {
    /// A page button was activated
    fn on_page_change(&mut self, _page: u32) {}

    /// A different page size was picked
    fn on_limit_change(&mut self, _limit: u32) {}

    /// The debounced search term settled
    fn on_search(&mut self, _term: &str) {}

    /// The set of selected row ids changed
    fn on_selection_change(&mut self, _selected: &SelectionSet) {}
}

/// Event produced by a user interaction with the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Navigate to the given page
    PageChange(u32),
    /// Switch to the given page size
    LimitChange(u32),
    /// Search for the given term
    Search(String),
    /// New selection
    SelectionChange(SelectionSet),
}

impl TableEvent {
    /// Deliver the event to the matching listener callback
    pub fn dispatch<L: TableListener + ?Sized>(self, listener: &mut L) {
        match self {
            Self::PageChange(page) => listener.on_page_change(page),
            Self::LimitChange(limit) => listener.on_limit_change(limit),
            Self::Search(term) => listener.on_search(&term),
            Self::SelectionChange(selected) => listener.on_selection_change(&selected),
        }
    }
}

/// Per-render inputs
#[derive(Debug)]
pub struct TableProps<'a, T> {
    /// Rows of the current page
    pub data: &'a [T],
    /// Show skeleton rows instead of `data`
    pub loading: bool,
    /// Pagination state, if the list is paginated
    pub pagination: Option<PaginationState>,
    /// Externally owned selection; `None` lets the table track it
    pub selected_rows: Option<&'a SelectionSet>,
}

impl<'a, T> TableProps<'a, T> {
    /// Props for a loaded page of `data`
    #[must_use]
    pub const fn new(data: &'a [T]) -> Self {
        Self {
            data,
            loading: false,
            pagination: None,
            selected_rows: None,
        }
    }

    /// Set the loading flag
    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Attach pagination state
    #[must_use]
    pub fn paginated(mut self, pagination: Option<PaginationState>) -> Self {
        self.pagination = pagination;
        self
    }

    /// Run the table in controlled selection mode
    #[must_use]
    pub fn selected(mut self, selected: &'a SelectionSet) -> Self {
        self.selected_rows = Some(selected);
        self
    }
}

/// Action offered for the selected rows, submitted as `action=<command>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAction {
    /// Button label
    pub label: String,
    /// Form value naming the action
    pub command: String,
}

impl BulkAction {
    /// Create a bulk action
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Search box contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBoxView {
    /// Text currently in the box
    pub value: String,
    /// Placeholder text
    pub placeholder: String,
}

/// Header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderCell {
    /// "Select all" checkbox for the current page
    SelectAll(PageSelection),
    /// Data column
    Column {
        /// Column key
        key: String,
        /// Column label
        label: String,
        /// Whether the column is sortable
        sortable: bool,
    },
    /// Trailing actions column
    Actions,
}

/// One data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Row identifier, if one could be extracted
    pub id: Option<String>,
    /// Checkbox state; `None` when the row cannot be selected
    pub selection: Option<bool>,
    /// Data cells followed by the actions cell, if any
    pub cells: Vec<Cell>,
}

/// Table body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// Placeholder rows while loading
    Skeleton {
        /// Number of placeholder rows
        rows: usize,
        /// Cells per placeholder row
        columns: usize,
    },
    /// Single row spanning the whole table
    Empty {
        /// Message shown
        message: String,
        /// Number of columns spanned
        colspan: usize,
    },
    /// Data rows
    Rows(Vec<RowView>),
}

/// Immutable rendering of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Search box, when the table is searchable
    pub search: Option<SearchBoxView>,
    /// Bulk actions, shown only while something is selected
    pub bulk_actions: Vec<BulkAction>,
    /// Number of selected rows across all pages
    pub selected_count: usize,
    /// Selected ids that are not rows of the current page
    pub off_page_selection: Vec<String>,
    /// Whether rows carry a checkbox column
    pub selectable: bool,
    /// Header cells in display order
    pub header: Vec<HeaderCell>,
    /// Body
    pub body: TableBody,
    /// Footer, when paginated
    pub footer: Option<FooterView>,
}

struct SearchBox {
    placeholder: String,
    value: String,
    delay: Duration,
    debouncer: Option<SearchDebouncer>,
    queries: Option<mpsc::UnboundedReceiver<String>>,
}

/// Paginated list renderer
pub struct DataTable<T> {
    columns: ColumnSet<T>,
    id_field: Option<String>,
    selectable: bool,
    actions: Option<RenderFn<T>>,
    bulk_actions: Vec<BulkAction>,
    limit_options: Vec<u32>,
    search: Option<SearchBox>,
    selection: SelectionTracker,
}

impl<T> DataTable<T> {
    /// Create a table over the given columns
    #[must_use]
    pub fn new(columns: ColumnSet<T>) -> Self {
        Self {
            columns,
            id_field: None,
            selectable: false,
            actions: None,
            bulk_actions: Vec::new(),
            limit_options: DEFAULT_LIMIT_OPTIONS.to_vec(),
            search: None,
            selection: SelectionTracker::new(),
        }
    }

    /// Add a leading checkbox column
    #[must_use]
    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    /// Read row ids from `field` instead of `_id`/`id`
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Add a trailing actions column
    #[must_use]
    pub fn with_actions<F>(mut self, actions: F) -> Self
    where
        F: Fn(&T) -> Cell + Send + Sync + 'static,
    {
        self.actions = Some(Arc::new(actions));
        self
    }

    /// Actions shown above the table while rows are selected
    #[must_use]
    pub fn with_bulk_actions(mut self, actions: Vec<BulkAction>) -> Self {
        self.bulk_actions = actions;
        self
    }

    /// Override the page sizes offered in the footer
    #[must_use]
    pub fn with_limit_options(mut self, options: Vec<u32>) -> Self {
        self.limit_options = options;
        self
    }

    /// Add a debounced search box
    #[must_use]
    pub fn searchable(mut self, delay: Duration, placeholder: impl Into<String>) -> Self {
        self.search = Some(SearchBox {
            placeholder: placeholder.into(),
            value: String::new(),
            delay,
            debouncer: None,
            queries: None,
        });
        self
    }

    /// Add a search box with the default debounce delay
    #[must_use]
    pub fn with_search(self, placeholder: impl Into<String>) -> Self {
        self.searchable(DEFAULT_SEARCH_DEBOUNCE, placeholder)
    }

    /// Columns in display order
    #[must_use]
    pub const fn columns(&self) -> &ColumnSet<T> {
        &self.columns
    }

    /// Current search box text, if searchable
    #[must_use]
    pub fn search_value(&self) -> Option<&str> {
        self.search.as_ref().map(|search| search.value.as_str())
    }

    /// Replace the search box text without triggering a search
    pub fn set_search_value(&mut self, value: impl Into<String>) {
        if let Some(search) = self.search.as_mut() {
            search.value = value.into();
        }
    }

    /// A keystroke in the search box
    ///
    /// The matching [`TableEvent::Search`] is delivered by [`Self::next_search`]
    /// once the input has been quiet for the debounce delay. Needs a tokio
    /// runtime; without one the text is kept but no search is scheduled.
    pub fn type_search(&mut self, text: impl Into<String>) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        search.value = text.into();

        if search.debouncer.is_none() {
            if tokio::runtime::Handle::try_current().is_err() {
                warn!("no tokio runtime, search input not debounced");
                return;
            }
            let (debouncer, queries) = SearchDebouncer::channel(search.delay);
            search.debouncer = Some(debouncer);
            search.queries = Some(queries);
        }
        if let Some(debouncer) = search.debouncer.as_ref() {
            debouncer.input(search.value.clone());
        }
    }

    /// Wait for the next settled search term
    ///
    /// Resolves to `None` when the table is not searchable or nothing has
    /// been typed yet.
    pub async fn next_search(&mut self) -> Option<TableEvent> {
        let queries = self.search.as_mut()?.queries.as_mut()?;
        queries.recv().await.map(TableEvent::Search)
    }

    /// Settled search term, if one is ready now
    pub fn try_next_search(&mut self) -> Option<TableEvent> {
        let queries = self.search.as_mut()?.queries.as_mut()?;
        queries.try_recv().ok().map(TableEvent::Search)
    }

    /// Resolve a page-strip button
    #[must_use]
    pub fn navigate(&self, pagination: &PaginationState, intent: PageIntent) -> Option<TableEvent> {
        let page = PaginationController::new(pagination).resolve(intent)?;
        debug!(page, "page change");
        Some(TableEvent::PageChange(page))
    }

    /// Pick a page size from the footer selector
    #[must_use]
    pub fn change_limit(&self, limit: u32) -> Option<TableEvent> {
        self.limit_options
            .contains(&limit)
            .then_some(TableEvent::LimitChange(limit))
    }
}

impl<T: TableRow> DataTable<T> {
    fn row_id(&self, row: &T) -> Option<String> {
        row.row_id(self.id_field.as_deref())
    }

    fn page_ids(&self, data: &[T]) -> Vec<String> {
        data.iter().filter_map(|row| self.row_id(row)).collect()
    }

    /// Toggle one row's checkbox
    pub fn toggle_row(&mut self, props: &TableProps<'_, T>, id: &str) -> Option<TableEvent> {
        if !self.selectable {
            return None;
        }
        let selected = self.selection.toggle_row(props.selected_rows, id);
        Some(TableEvent::SelectionChange(selected))
    }

    /// Toggle the header "select all" checkbox for the current page
    pub fn toggle_all(&mut self, props: &TableProps<'_, T>) -> Option<TableEvent> {
        if !self.selectable {
            return None;
        }
        let page_ids = self.page_ids(props.data);
        let selected = self.selection.toggle_page(props.selected_rows, &page_ids);
        Some(TableEvent::SelectionChange(selected))
    }

    /// Clear the selection, e.g. after a bulk action
    pub fn clear_selection(&mut self, props: &TableProps<'_, T>) -> Option<TableEvent> {
        if !self.selectable {
            return None;
        }
        Some(TableEvent::SelectionChange(
            self.selection.clear(props.selected_rows),
        ))
    }

    /// Render the table for the given props
    #[must_use]
    pub fn render(&self, props: &TableProps<'_, T>) -> TableView {
        let selected = self.selection.current(props.selected_rows);

        let mut header = Vec::with_capacity(self.columns.len() + 2);
        let mut off_page_selection = Vec::new();
        if self.selectable {
            let page_ids = self.page_ids(props.data);
            header.push(HeaderCell::SelectAll(PageSelection::of(selected, &page_ids)));
            off_page_selection = selected
                .iter()
                .filter(|id| !page_ids.contains(*id))
                .cloned()
                .collect();
        }
        header.extend(self.columns.iter().map(|column: &Column<T>| HeaderCell::Column {
            key: column.key().to_string(),
            label: column.header().to_string(),
            sortable: column.is_sortable(),
        }));
        if self.actions.is_some() {
            header.push(HeaderCell::Actions);
        }

        let body = if props.loading {
            TableBody::Skeleton {
                rows: SKELETON_ROWS,
                columns: header.len(),
            }
        } else if props.data.is_empty() {
            TableBody::Empty {
                message: self.empty_message(),
                colspan: header.len(),
            }
        } else {
            TableBody::Rows(
                props
                    .data
                    .iter()
                    .map(|row| self.render_row(row, selected))
                    .collect(),
            )
        };

        let bulk_actions = if selected.is_empty() {
            Vec::new()
        } else {
            self.bulk_actions.clone()
        };

        TableView {
            search: self.search.as_ref().map(|search| SearchBoxView {
                value: search.value.clone(),
                placeholder: search.placeholder.clone(),
            }),
            bulk_actions,
            selected_count: selected.len(),
            off_page_selection,
            selectable: self.selectable,
            header,
            body,
            footer: props.pagination.as_ref().and_then(|pagination| {
                PaginationController::new(pagination).footer(&self.limit_options)
            }),
        }
    }

    fn render_row(&self, row: &T, selected: &SelectionSet) -> RowView {
        let id = self.row_id(row);
        let selection = if self.selectable {
            id.as_ref().map(|id| selected.contains(id))
        } else {
            None
        };
        let mut cells: Vec<Cell> = self.columns.iter().map(|column| column.cell(row)).collect();
        if let Some(actions) = self.actions.as_ref() {
            cells.push(actions(row));
        }
        RowView {
            id,
            selection,
            cells,
        }
    }

    fn empty_message(&self) -> String {
        match self.search_value().map(str::trim) {
            Some(term) if !term.is_empty() => format!("No results found for \"{term}\""),
            _ => "No data available".to_string(),
        }
    }
}

impl<T> fmt::Debug for DataTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns)
            .field("id_field", &self.id_field)
            .field("selectable", &self.selectable)
            .field("actions", &self.actions.is_some())
            .field("bulk_actions", &self.bulk_actions)
            .field("limit_options", &self.limit_options)
            .field("search", &self.search_value())
            .finish_non_exhaustive()
    }
}
