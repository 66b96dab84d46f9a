//! Column descriptors projecting row fields into table cells

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling a table
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// Two columns share the same key
    #[error("duplicate column key '{0}'")]
    DuplicateColumn(String),
}

/// Visual tone of a badge cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Default grey
    Neutral,
    /// Green
    Success,
    /// Amber
    Warning,
    /// Red
    Danger,
    /// Blue
    Info,
}

impl Tone {
    /// CSS modifier used by the HTML renderer
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Info => "info",
        }
    }
}

/// Renderable cell content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Nothing to show
    Empty,
    /// Plain text
    Text(String),
    /// Status pill
    Badge {
        /// Badge label
        label: String,
        /// Badge colour
        tone: Tone,
    },
    /// Hyperlink
    Link {
        /// Link label
        label: String,
        /// Link target
        href: String,
    },
}

impl Cell {
    /// Plain text cell
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Badge cell
    pub fn badge(label: impl Into<String>, tone: Tone) -> Self {
        Self::Badge {
            label: label.into(),
            tone,
        }
    }

    /// Link cell
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Link {
            label: label.into(),
            href: href.into(),
        }
    }

    /// Visible text of the cell
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text(text) => text,
            Self::Badge { label, .. } | Self::Link { label, .. } => label,
        }
    }
}

/// Rows the table can display
///
/// The table never looks inside a row beyond these two projections.
pub trait TableRow {
    /// Row identifier read from `id_field`, or from `_id` then `id` when `None`
    fn row_id(&self, id_field: Option<&str>) -> Option<String>;

    /// Raw projection of the field named `key`
    fn field(&self, key: &str) -> Cell;
}

/// Look up a possibly dotted key (`route.title`) in a JSON row
#[must_use]
pub fn lookup<'a>(row: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(key) {
        return Some(value);
    }
    key.split('.')
        .try_fold(row, |current, part| current.get(part))
}

/// Convert a JSON scalar into display text
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) => {
            if items.iter().all(|item| !item.is_object() && !item.is_array()) {
                Some(
                    items
                        .iter()
                        .filter_map(value_text)
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            } else {
                Some(value.to_string())
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

impl TableRow for Value {
    fn row_id(&self, id_field: Option<&str>) -> Option<String> {
        let raw = match id_field {
            Some(field) => lookup(self, field),
            None => self.get("_id").or_else(|| self.get("id")),
        }?;
        match raw {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn field(&self, key: &str) -> Cell {
        lookup(self, key)
            .and_then(value_text)
            .map_or(Cell::Empty, Cell::Text)
    }
}

/// Render function attached to a column
pub type RenderFn<T> = Arc<dyn Fn(&T) -> Cell + Send + Sync>;

/// How a column produces its cell
pub enum CellSource<T> {
    /// Show the raw field named after the column key
    Field,
    /// Custom render function
    Render(RenderFn<T>),
}

impl<T> Clone for CellSource<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Field => Self::Field,
            Self::Render(render) => Self::Render(Arc::clone(render)),
        }
    }
}

/// Column descriptor: `{ key, header, cell?, sortable? }`
pub struct Column<T> {
    key: String,
    header: String,
    source: CellSource<T>,
    sortable: bool,
}

impl<T> Column<T> {
    /// Column showing the raw field named `key`
    pub fn field(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            source: CellSource::Field,
            sortable: false,
        }
    }

    /// Column with a custom render function
    pub fn render<F>(key: impl Into<String>, header: impl Into<String>, render: F) -> Self
    where
        F: Fn(&T) -> Cell + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            header: header.into(),
            source: CellSource::Render(Arc::new(render)),
            sortable: false,
        }
    }

    /// Mark the column as sortable
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Column key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Header label
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether the column is sortable
    #[must_use]
    pub const fn is_sortable(&self) -> bool {
        self.sortable
    }
}

impl<T: TableRow> Column<T> {
    /// Project a row into this column's cell
    pub fn cell(&self, row: &T) -> Cell {
        match &self.source {
            CellSource::Field => row.field(&self.key),
            CellSource::Render(render) => render(row),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            source: self.source.clone(),
            sortable: self.sortable,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field(
                "source",
                &match self.source {
                    CellSource::Field => "field",
                    CellSource::Render(_) => "render",
                },
            )
            .field("sortable", &self.sortable)
            .finish()
    }
}

/// Ordered set of columns with unique keys
pub struct ColumnSet<T> {
    columns: Vec<Column<T>>,
}

impl<T> fmt::Debug for ColumnSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.columns).finish()
    }
}

impl<T> Clone for ColumnSet<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> ColumnSet<T> {
    /// Build a column set
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] when two columns share a key.
    pub fn new(columns: Vec<Column<T>>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(TableError::DuplicateColumn(column.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Iterate over the columns in display order
    pub fn iter(&self) -> std::slice::Iter<'_, Column<T>> {
        self.columns.iter()
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the set has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a ColumnSet<T> {
    type Item = &'a Column<T>;
    type IntoIter = std::slice::Iter<'a, Column<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_id_prefers_underscore_id() {
        let row = json!({"_id": "65f0c1", "id": 7});
        assert_eq!(row.row_id(None).as_deref(), Some("65f0c1"));

        let row = json!({"id": 7});
        assert_eq!(row.row_id(None).as_deref(), Some("7"));

        let row = json!({"name": "no id"});
        assert_eq!(row.row_id(None), None);
    }

    #[test]
    fn test_custom_id_field() {
        let row = json!({"_id": "x", "bookingNumber": "BK-1001"});
        assert_eq!(row.row_id(Some("bookingNumber")).as_deref(), Some("BK-1001"));
    }

    #[test]
    fn test_field_projection() {
        let row = json!({
            "title": "Addis Ababa - Bahir Dar",
            "distance": 565,
            "active": true,
            "note": null,
            "stops": ["Debre Markos", "Dejen"],
            "route": {"origin": "Addis Ababa"}
        });

        assert_eq!(row.field("title"), Cell::text("Addis Ababa - Bahir Dar"));
        assert_eq!(row.field("distance"), Cell::text("565"));
        assert_eq!(row.field("active"), Cell::text("true"));
        assert_eq!(row.field("note"), Cell::Empty);
        assert_eq!(row.field("missing"), Cell::Empty);
        assert_eq!(row.field("stops"), Cell::text("Debre Markos, Dejen"));
        assert_eq!(row.field("route.origin"), Cell::text("Addis Ababa"));
    }

    #[test]
    fn test_render_column_overrides_field() {
        let column: Column<Value> = Column::render("status", "Status", |row: &Value| {
            Cell::badge(row.field("status").label().to_uppercase(), Tone::Success)
        });
        let row = json!({"status": "active"});

        assert_eq!(column.cell(&row), Cell::badge("ACTIVE", Tone::Success));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ColumnSet::<Value>::new(vec![
            Column::field("name", "Name"),
            Column::field("name", "Full name"),
        ]);

        assert_eq!(
            result.unwrap_err(),
            TableError::DuplicateColumn("name".to_string())
        );
    }

    #[test]
    fn test_empty_column_set_allowed() {
        let set = ColumnSet::<Value>::new(Vec::new()).expect("empty set");
        assert!(set.is_empty());
    }

    #[test]
    fn test_sortable_flag() {
        let column = Column::<Value>::field("name", "Name").sortable();
        assert!(column.is_sortable());
        assert_eq!(column.key(), "name");
        assert_eq!(column.header(), "Name");
    }
}
