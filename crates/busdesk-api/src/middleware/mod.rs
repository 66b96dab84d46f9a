//! Middleware for the admin token, request logging and CORS

pub mod auth;
pub mod cors;
pub mod logging;
