//! busdesk admin web front
//!
//! Server-rendered list pages for the bus-ticketing back-office, built on a
//! generic paginated data table.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod components;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;

// Re-export the main functions
pub use server::build_app;
pub use state::AppState;
