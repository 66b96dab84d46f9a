//! HTTP handlers for the admin pages

pub mod health;
pub mod pages;
