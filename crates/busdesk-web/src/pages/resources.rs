//! Column sets and page metadata for each admin resource

use crate::components::column::lookup;
use super::list_page::BulkCommand;
use crate::components::{
    BulkAction, Cell, Column, ColumnSet, DataTable, TableError, TableRow, Tone,
};
use busdesk_core::AdminResource;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::time::Duration;

/// Statuses offered by the bulk status action
pub const BULK_STATUSES: [&str; 2] = ["active", "inactive"];

/// Badge tone for a status string
#[must_use]
pub fn status_tone(status: &str) -> Tone {
    match status.to_ascii_lowercase().as_str() {
        "active" | "confirmed" | "paid" | "completed" | "approved" => Tone::Success,
        "pending" | "scheduled" | "boarding" => Tone::Warning,
        "inactive" | "cancelled" | "canceled" | "suspended" | "failed" | "refunded" => {
            Tone::Danger
        }
        "departed" | "in-transit" => Tone::Info,
        _ => Tone::Neutral,
    }
}

/// Render a status field as a badge
#[must_use]
pub fn status_badge(row: &Value, key: &str) -> Cell {
    match row.field(key) {
        Cell::Text(status) => {
            let tone = status_tone(&status);
            Cell::badge(status, tone)
        }
        _ => Cell::Empty,
    }
}

/// Format an RFC 3339 timestamp or `YYYY-MM-DD` date for display
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn format_date(raw: &str, with_time: bool) -> String {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        let format = if with_time { "%b %d, %Y %H:%M" } else { "%b %d, %Y" };
        return timestamp.format(format).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %d, %Y").to_string();
    }
    raw.to_string()
}

fn date(key: &'static str, header: &'static str) -> Column<Value> {
    Column::render(key, header, move |row: &Value| match row.field(key) {
        Cell::Text(raw) => Cell::text(format_date(&raw, false)),
        other => other,
    })
}

fn datetime(key: &'static str, header: &'static str) -> Column<Value> {
    Column::render(key, header, move |row: &Value| match row.field(key) {
        Cell::Text(raw) => Cell::text(format_date(&raw, true)),
        other => other,
    })
}

fn money(key: &'static str, header: &'static str) -> Column<Value> {
    Column::render(key, header, move |row: &Value| {
        match lookup(row, key).and_then(Value::as_f64) {
            Some(amount) => Cell::text(format!("ETB {amount:.2}")),
            None => row.field(key),
        }
    })
}

fn percent(key: &'static str, header: &'static str) -> Column<Value> {
    Column::render(key, header, move |row: &Value| match row.field(key) {
        Cell::Text(rate) => Cell::text(format!("{rate}%")),
        other => other,
    })
}

fn badge(key: &'static str, header: &'static str) -> Column<Value> {
    Column::render(key, header, move |row: &Value| status_badge(row, key))
}

fn text(key: &'static str, header: &'static str) -> Column<Value> {
    Column::field(key, header)
}

/// Column set for `resource`
///
/// # Errors
///
/// Returns [`TableError::DuplicateColumn`] if a column key is repeated.
pub fn columns(resource: AdminResource) -> Result<ColumnSet<Value>, TableError> {
    let columns = match resource {
        AdminResource::Users => vec![
            text("name", "Name").sortable(),
            text("email", "Email"),
            text("phone", "Phone"),
            text("role", "Role"),
            badge("status", "Status"),
            date("createdAt", "Joined").sortable(),
        ],
        AdminResource::Agents => vec![
            text("name", "Name").sortable(),
            text("email", "Email"),
            text("phone", "Phone"),
            percent("commissionRate", "Commission"),
            badge("status", "Status"),
        ],
        AdminResource::Drivers => vec![
            text("name", "Name").sortable(),
            text("phone", "Phone"),
            text("licenseNumber", "License"),
            text("bus.plateNumber", "Bus"),
            badge("status", "Status"),
        ],
        AdminResource::Buses => vec![
            text("plateNumber", "Plate").sortable(),
            text("busType.name", "Type"),
            text("capacity", "Capacity"),
            text("driver.name", "Driver"),
            badge("status", "Status"),
        ],
        AdminResource::BusTypes => vec![
            text("name", "Name").sortable(),
            text("seats", "Seats"),
            text("amenities", "Amenities"),
            text("description", "Description"),
        ],
        AdminResource::Routes => vec![
            text("title", "Title").sortable(),
            text("origin", "Origin"),
            text("destination", "Destination"),
            text("distance", "Distance (km)"),
            text("duration", "Duration"),
            badge("status", "Status"),
        ],
        AdminResource::Subroutes => vec![
            text("route.title", "Route"),
            text("origin", "From"),
            text("destination", "To"),
            money("price", "Price"),
            text("order", "Order"),
        ],
        AdminResource::Trips => vec![
            text("route.title", "Route"),
            text("bus.plateNumber", "Bus"),
            datetime("departureTime", "Departure").sortable(),
            datetime("arrivalTime", "Arrival"),
            text("availableSeats", "Seats left"),
            badge("status", "Status"),
        ],
        AdminResource::Bookings => vec![
            text("bookingNumber", "Booking").sortable(),
            text("passengerName", "Passenger"),
            text("trip.route.title", "Route"),
            text("seatNumbers", "Seats"),
            money("totalAmount", "Amount"),
            badge("paymentStatus", "Payment"),
            badge("status", "Status"),
            date("createdAt", "Booked").sortable(),
        ],
        AdminResource::Prices => vec![
            text("route.title", "Route"),
            text("busType.name", "Bus type"),
            money("amount", "Fare"),
            date("effectiveFrom", "Effective from"),
        ],
        AdminResource::Commissions => vec![
            text("agent.name", "Agent"),
            percent("rate", "Rate"),
            text("type", "Type"),
            date("createdAt", "Created"),
        ],
        AdminResource::Locations => vec![
            text("name", "Name").sortable(),
            text("region", "Region"),
            text("type", "Type"),
            badge("status", "Status"),
        ],
    };
    ColumnSet::new(columns)
}

/// Placeholder shown in the search box of `resource`
#[must_use]
pub fn search_placeholder(resource: AdminResource) -> String {
    format!("Search {}...", resource.title().to_lowercase())
}

/// Fully configured list table for `resource`
///
/// # Errors
///
/// Returns [`TableError`] if the column set is invalid.
pub fn table(
    resource: AdminResource,
    limit_options: Vec<u32>,
    search_delay: Duration,
) -> Result<DataTable<Value>, TableError> {
    let mut bulk_actions = vec![BulkAction::new("Delete selected", BulkCommand::Delete.to_string())];
    if has_status(resource) {
        bulk_actions.extend(BULK_STATUSES.iter().map(|status| {
            BulkAction::new(
                format!("Mark {status}"),
                BulkCommand::SetStatus((*status).to_string()).to_string(),
            )
        }));
    }

    Ok(DataTable::new(columns(resource)?)
        .selectable()
        .with_limit_options(limit_options)
        .searchable(search_delay, search_placeholder(resource))
        .with_bulk_actions(bulk_actions))
}

/// Whether records of `resource` carry a `status` field
#[must_use]
pub const fn has_status(resource: AdminResource) -> bool {
    !matches!(
        resource,
        AdminResource::BusTypes
            | AdminResource::Subroutes
            | AdminResource::Prices
            | AdminResource::Commissions
    )
}
