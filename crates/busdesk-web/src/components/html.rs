//! Server-side rendering of a [`TableView`] as Leptos components
//!
//! The table is wrapped in a POST form so the checkboxes, the page toggle
//! and the bulk buttons work without client-side script. Every button
//! submits an `action` field naming what to do.

use super::column::Cell;
use super::data_table::{BulkAction, HeaderCell, RowView, SearchBoxView, TableBody, TableView};
use super::pagination::{FooterView, PageItem, PageStrip};
use super::selection::PageSelection;
use crate::api_client::ListQuery;
use leptos::prelude::*;

/// `action` value that only applies the checked boxes
pub const APPLY_SELECTION: &str = "select";
/// `action` value that selects or clears every row of the page
pub const TOGGLE_PAGE: &str = "toggle-page";

/// URLs and carried form state for one list page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLinks {
    path: String,
    query: ListQuery,
}

impl TableLinks {
    /// Links for the list at `path` showing `query`
    #[must_use]
    pub fn new(path: impl Into<String>, query: ListQuery) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Path of the list page
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Link to `page` at `limit` rows, keeping the search and filters
    #[must_use]
    pub fn page(&self, page: u32, limit: u32) -> String {
        let query = ListQuery {
            page,
            limit,
            ..self.query.clone()
        };
        format!("{}?{}", self.path, query.to_query_string())
    }

    /// Target of the bulk form
    #[must_use]
    pub fn bulk(&self) -> String {
        format!("{}/bulk", self.path)
    }

    /// Fields that carry the current query through a form post
    #[must_use]
    pub fn state(&self) -> Vec<(String, String)> {
        self.query.to_pairs()
    }

    /// Fields the search form keeps: the page size and the filters
    #[must_use]
    pub fn search_state(&self) -> Vec<(String, String)> {
        self.state()
            .into_iter()
            .filter(|(key, _)| key != "page" && key != "search")
            .collect()
    }
}

/// Hidden inputs, one per pair
#[component]
pub fn HiddenFields(
    /// Field names and values
    pairs: Vec<(String, String)>,
) -> impl IntoView {
    pairs
        .into_iter()
        .map(|(name, value)| view! { <input type="hidden" name=name value=value/> })
        .collect::<Vec<_>>()
}

/// Contents of one table cell
#[component]
pub fn CellView(
    /// Cell to show
    cell: Cell,
) -> impl IntoView {
    match cell {
        Cell::Empty => ().into_any(),
        Cell::Text(text) => text.into_any(),
        Cell::Badge { label, tone } => {
            let class = format!("badge badge-{}", tone.as_class());
            view! { <span class=class>{label}</span> }.into_any()
        }
        Cell::Link { label, href } => view! { <a href=href>{label}</a> }.into_any(),
    }
}

#[component]
fn SearchForm(search: SearchBoxView, action: String, state: Vec<(String, String)>) -> impl IntoView {
    view! {
        <form class="table-search" method="get" action=action>
            <input
                type="search"
                name="search"
                value=search.value
                placeholder=search.placeholder
            />
            <HiddenFields pairs=state/>
        </form>
    }
}

#[component]
fn SelectionBar(selected_count: usize, actions: Vec<BulkAction>) -> impl IntoView {
    let summary = format!("{selected_count} selected");
    let buttons = actions
        .into_iter()
        .map(|action| {
            view! {
                <button type="submit" name="action" value=action.command>
                    {action.label}
                </button>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="bulk-actions">
            <span class="selected-count">{summary}</span>
            <button type="submit" name="action" value=APPLY_SELECTION>
                "Update selection"
            </button>
            {buttons}
        </div>
    }
}

#[component]
fn HeaderCellView(cell: HeaderCell) -> impl IntoView {
    match cell {
        HeaderCell::SelectAll(state) => {
            let (label, marker) = match state {
                PageSelection::None => ("Select page", "none"),
                PageSelection::Partial => ("Select page", "partial"),
                PageSelection::All => ("Clear page", "all"),
            };
            view! {
                <th class="select">
                    <button type="submit" name="action" value=TOGGLE_PAGE data-state=marker>
                        {label}
                    </button>
                </th>
            }
            .into_any()
        }
        HeaderCell::Column {
            key,
            label,
            sortable,
        } => {
            let class = if sortable { "sortable" } else { "" };
            view! { <th data-key=key class=class>{label}</th> }.into_any()
        }
        HeaderCell::Actions => view! { <th class="actions">"Actions"</th> }.into_any(),
    }
}

#[component]
fn DataRow(row: RowView, selectable: bool) -> impl IntoView {
    let RowView {
        id,
        selection,
        cells,
    } = row;
    let select = if selectable {
        let cell = match (id, selection) {
            (Some(id), Some(checked)) => view! {
                <td><input type="checkbox" name="selected" value=id checked=checked/></td>
            }
            .into_any(),
            _ => view! { <td></td> }.into_any(),
        };
        Some(cell)
    } else {
        None
    };
    let cells = cells
        .into_iter()
        .map(|cell| view! { <td><CellView cell=cell/></td> })
        .collect::<Vec<_>>();

    view! { <tr>{select}{cells}</tr> }
}

#[component]
fn BodyRows(body: TableBody, selectable: bool) -> impl IntoView {
    match body {
        TableBody::Skeleton { rows, columns } => (0..rows)
            .map(|_| {
                let bars = (0..columns)
                    .map(|_| view! { <td><span class="skeleton-bar"></span></td> })
                    .collect::<Vec<_>>();
                view! { <tr class="skeleton">{bars}</tr> }
            })
            .collect::<Vec<_>>()
            .into_any(),
        TableBody::Empty { message, colspan } => {
            let colspan = colspan.to_string();
            view! { <tr class="empty"><td colspan=colspan>{message}</td></tr> }.into_any()
        }
        TableBody::Rows(rows) => rows
            .into_iter()
            .map(|row| view! { <DataRow row=row selectable=selectable/> })
            .collect::<Vec<_>>()
            .into_any(),
    }
}

/// Page strip: First, Previous, the page window, Next, Last
#[component]
pub fn PageLinks(
    /// Strip to render
    strip: PageStrip,
    /// Page size kept in every link
    limit: u32,
    /// Link builder
    links: TableLinks,
) -> impl IntoView {
    let PageStrip {
        current,
        items,
        first,
        previous,
        next,
        last,
    } = strip;
    let last_page = items.iter().rev().find_map(|item| match item {
        PageItem::Page(page) => Some(*page),
        PageItem::Ellipsis => None,
    });
    let button = |label: &'static str, target: Option<u32>, enabled: bool| match target {
        Some(page) if enabled => {
            let href = links.page(page, limit);
            view! { <a href=href>{label}</a> }.into_any()
        }
        _ => view! { <span class="disabled">{label}</span> }.into_any(),
    };

    let first = button("First", Some(1), first);
    let previous = button("Previous", current.checked_sub(1), previous);
    let next = button("Next", current.checked_add(1), next);
    let last = button("Last", last_page, last);
    let pages = items
        .into_iter()
        .map(|item| match item {
            PageItem::Page(page) if page == current => {
                view! { <span class="current">{page.to_string()}</span> }.into_any()
            }
            PageItem::Page(page) => {
                let href = links.page(page, limit);
                view! { <a href=href>{page.to_string()}</a> }.into_any()
            }
            PageItem::Ellipsis => view! { <span class="ellipsis">"…"</span> }.into_any(),
        })
        .collect::<Vec<_>>();

    view! { <nav class="pagination">{first}{previous}{pages}{next}{last}</nav> }
}

#[component]
fn TableFooter(footer: FooterView, links: TableLinks) -> impl IntoView {
    let FooterView {
        summary,
        limit,
        limit_options,
        strip,
    } = footer;
    let sizes = limit_options
        .into_iter()
        .map(|option| {
            if option == limit {
                view! { <strong>{option.to_string()}</strong> }.into_any()
            } else {
                let href = links.page(1, option);
                view! { <a href=href>{option.to_string()}</a> }.into_any()
            }
        })
        .collect::<Vec<_>>();
    let strip = strip.map(|strip| view! { <PageLinks strip=strip limit=limit links=links.clone()/> });

    view! {
        <div class="table-footer">
            <span class="summary">{summary}</span>
            <span class="page-size">{sizes}</span>
            {strip}
        </div>
    }
}

/// The whole list: search form, bulk form with the grid, and the footer
#[component]
pub fn ListTable(
    /// Rendered table state
    table: TableView,
    /// Link builder for the page
    links: TableLinks,
) -> impl IntoView {
    let TableView {
        search,
        bulk_actions,
        selected_count,
        off_page_selection,
        selectable,
        header,
        body,
        footer,
    } = table;

    let search = search.map(|search| {
        view! {
            <SearchForm search=search action=links.path().to_string() state=links.search_state()/>
        }
    });
    let header = header
        .into_iter()
        .map(|cell| view! { <HeaderCellView cell=cell/> })
        .collect::<Vec<_>>();
    let grid = view! {
        <table>
            <thead><tr>{header}</tr></thead>
            <tbody><BodyRows body=body selectable=selectable/></tbody>
        </table>
    };
    let grid = if selectable {
        let mut state = links.state();
        state.extend(
            off_page_selection
                .into_iter()
                .map(|id| ("selected".to_string(), id)),
        );
        view! {
            <form class="bulk-form" method="post" action=links.bulk()>
                <HiddenFields pairs=state/>
                <SelectionBar selected_count=selected_count actions=bulk_actions/>
                {grid}
            </form>
        }
        .into_any()
    } else {
        grid.into_any()
    };
    let footer = footer.map(|footer| view! { <TableFooter footer=footer links=links.clone()/> });

    view! { <div class="data-table">{search}{grid}{footer}</div> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::column::{Column, ColumnSet, Tone};
    use crate::components::data_table::{DataTable, TableProps};
    use crate::components::selection::SelectionSet;
    use busdesk_core::PaginationState;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn links() -> TableLinks {
        let mut query = ListQuery::new(1, 10);
        query.filters.insert("status".to_string(), "active".to_string());
        TableLinks::new("/admin/users", query)
    }

    fn table() -> DataTable<Value> {
        DataTable::new(
            ColumnSet::new(vec![Column::field("name", "Name"), Column::field("phone", "Phone")])
                .expect("columns"),
        )
        .selectable()
        .with_bulk_actions(vec![BulkAction::new("Delete selected", "delete")])
    }

    fn html(table: TableView) -> String {
        let links = links();
        view! { <ListTable table=table links=links/> }.to_html()
    }

    #[test]
    fn test_badge_cell() {
        let html = view! { <CellView cell=Cell::badge("active", Tone::Success)/> }.to_html();
        assert!(html.contains(r#"<span class="badge badge-success">active</span>"#), "{html}");
    }

    #[test]
    fn test_skeleton_has_five_rows() {
        let data: Vec<Value> = Vec::new();
        let html = html(table().render(&TableProps::new(&data).loading(true)));
        assert_eq!(html.matches(r#"<tr class="skeleton">"#).count(), 5);
        assert_eq!(html.matches("skeleton-bar").count(), 15);
    }

    #[test]
    fn test_rows_are_escaped() {
        let data = vec![json!({"_id": "u1", "name": "<script>", "phone": "+251 911"})];
        let html = html(table().render(&TableProps::new(&data)));

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"value="u1""#));
    }

    #[test]
    fn test_bulk_form_carries_state_and_off_page_selection() {
        let data = vec![json!({"_id": "u1", "name": "Abebe"})];
        let selected: SelectionSet = ["u1", "u9"].iter().map(ToString::to_string).collect();
        let html = html(table().render(&TableProps::new(&data).selected(&selected)));

        assert!(html.contains(r#"action="/admin/users/bulk""#));
        assert!(html.contains(r#"<input type="hidden" name="status" value="active""#));
        assert!(html.contains(r#"<input type="hidden" name="selected" value="u9""#));
        assert!(html.contains("2 selected"));
        assert!(html.contains(r#"value="delete""#));
        assert!(html.contains(r#"data-state="all""#));
        assert_eq!(html.matches(r#"type="checkbox""#).count(), 1);
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_bulk_buttons_hidden_without_selection() {
        let data = vec![json!({"_id": "u1", "name": "Abebe"})];
        let html = html(table().render(&TableProps::new(&data)));

        assert!(html.contains("0 selected"));
        assert!(!html.contains("Delete selected"));
        assert!(html.contains(r#"data-state="none""#));
    }

    #[test]
    fn test_search_form_keeps_filters_but_not_page() {
        let table = table().with_search("Search users");
        let data: Vec<Value> = Vec::new();
        let view = table.render(&TableProps::new(&data));
        let links = TableLinks::new(
            "/admin/users",
            ListQuery {
                page: 4,
                ..links().query
            },
        );
        let html = view! { <ListTable table=view links=links/> }.to_html();

        let search = html
            .split("</form>")
            .next()
            .expect("search form");
        assert!(search.contains(r#"class="table-search""#));
        assert!(search.contains(r#"name="status" value="active""#));
        assert!(search.contains(r#"name="limit" value="10""#));
        assert!(!search.contains(r#"name="page""#));
    }

    #[test]
    fn test_footer_links() {
        let data = vec![json!({"_id": "u1", "name": "Abebe"})];
        let props = TableProps::new(&data).paginated(Some(PaginationState::new(1, 10, 95)));
        let view = table()
            .with_limit_options(vec![10, 50])
            .render(&props);
        let html = html(view);

        assert!(html.contains("Showing 1 to 10 of 95 results"));
        assert!(html.contains(r#"<span class="disabled">Previous</span>"#));
        assert!(html.contains(r#"href="/admin/users?page=2&amp;limit=10&amp;status=active">Next</a>"#));
        assert!(html.contains(r#"href="/admin/users?page=10&amp;limit=10&amp;status=active">Last</a>"#));
        assert!(html.contains(r#"href="/admin/users?page=1&amp;limit=50&amp;status=active">50</a>"#));
        assert!(html.contains(r#"<span class="current">1</span>"#));
        assert!(html.contains('…'));
    }

    #[test]
    fn test_page_link_keeps_search() {
        let query = ListQuery {
            search: Some("abebe kebede".to_string()),
            ..ListQuery::new(1, 20)
        };
        let links = TableLinks::new("/admin/users", query);
        assert_eq!(links.page(3, 20), "/admin/users?page=3&limit=20&search=abebe%20kebede");
        assert_eq!(links.bulk(), "/admin/users/bulk");
        assert_eq!(links.search_state(), vec![("limit".to_string(), "20".to_string())]);
    }

    #[test]
    fn test_debounced_table_renders_search_value() {
        let mut table = table().searchable(Duration::from_millis(800), "Search users");
        table.set_search_value("Hawassa");
        let data: Vec<Value> = Vec::new();
        let html = html(table.render(&TableProps::new(&data)));
        assert!(html.contains(r#"value="Hawassa""#));
        assert!(html.contains(r#"placeholder="Search users""#));
    }
}
