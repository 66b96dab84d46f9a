//! Reusable list-rendering components

pub mod column;
pub mod data_table;
pub mod html;
pub mod pagination;
pub mod search;
pub mod selection;

pub use column::{Cell, Column, ColumnSet, TableError, TableRow, Tone};
pub use data_table::{BulkAction, DataTable, TableEvent, TableListener, TableProps, TableView};
pub use pagination::{PageIntent, PageItem, PaginationController, page_window};
pub use search::SearchDebouncer;
pub use selection::{SelectionSet, SelectionTracker};
