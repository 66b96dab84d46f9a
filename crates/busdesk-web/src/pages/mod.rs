//! Admin pages

pub mod layout;
pub mod list_page;
pub mod resources;

pub use layout::render_document;
pub use list_page::{BulkCommand, Confirmation, FetchTicket, ListPage, Notice, NoticeLevel};
