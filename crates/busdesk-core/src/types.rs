//! Shared wire types for the admin API and its callers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Admin list resources exposed under `/api/admin/<resource>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminResource {
    /// Platform users (customers and staff accounts)
    Users,
    /// Ticket-selling agents
    Agents,
    /// Bus drivers
    Drivers,
    /// Fleet vehicles
    Buses,
    /// Vehicle categories and seat layouts
    BusTypes,
    /// Intercity routes
    Routes,
    /// Stop-to-stop legs of a route
    Subroutes,
    /// Scheduled departures
    Trips,
    /// Ticket bookings
    Bookings,
    /// Fare table entries
    Prices,
    /// Agent commission rules
    Commissions,
    /// Cities and stations
    Locations,
}

impl AdminResource {
    /// Every resource, in navigation order
    pub const ALL: [Self; 12] = [
        Self::Users,
        Self::Agents,
        Self::Drivers,
        Self::Buses,
        Self::BusTypes,
        Self::Routes,
        Self::Subroutes,
        Self::Trips,
        Self::Bookings,
        Self::Prices,
        Self::Commissions,
        Self::Locations,
    ];

    /// Path segment used under `/api/admin/` and `/admin/`
    #[must_use]
    pub const fn as_segment(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Agents => "agents",
            Self::Drivers => "drivers",
            Self::Buses => "buses",
            Self::BusTypes => "bus-types",
            Self::Routes => "routes",
            Self::Subroutes => "subroutes",
            Self::Trips => "trips",
            Self::Bookings => "bookings",
            Self::Prices => "prices",
            Self::Commissions => "commissions",
            Self::Locations => "locations",
        }
    }

    /// Collection path on the upstream API
    #[must_use]
    pub const fn upstream_path(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Agents => "agents",
            Self::Drivers => "drivers",
            Self::Buses => "buses",
            Self::BusTypes => "bustypes",
            Self::Routes => "routes",
            Self::Subroutes => "subroutes",
            Self::Trips => "trips",
            Self::Bookings => "bookings",
            Self::Prices => "prices",
            Self::Commissions => "commissions",
            Self::Locations => "locations",
        }
    }

    /// Human readable title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Agents => "Agents",
            Self::Drivers => "Drivers",
            Self::Buses => "Buses",
            Self::BusTypes => "Bus Types",
            Self::Routes => "Routes",
            Self::Subroutes => "Subroutes",
            Self::Trips => "Trips",
            Self::Bookings => "Bookings",
            Self::Prices => "Prices",
            Self::Commissions => "Commissions",
            Self::Locations => "Locations",
        }
    }
}

impl fmt::Display for AdminResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_segment())
    }
}

impl FromStr for AdminResource {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_segment() == s)
            .ok_or_else(|| crate::Error::NotFound {
                resource: format!("admin resource '{s}'"),
            })
    }
}

/// Singleton settings sections under `/api/admin/settings/<section>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsSection {
    /// Logo, colours and site name
    Branding,
    /// Terms and conditions text
    Terms,
    /// Promotional popup shown on the storefront
    Popup,
    /// Default agent commission
    Commission,
}

impl SettingsSection {
    /// Every settings section
    pub const ALL: [Self; 4] = [Self::Branding, Self::Terms, Self::Popup, Self::Commission];

    /// Path segment of the section
    #[must_use]
    pub const fn as_segment(self) -> &'static str {
        match self {
            Self::Branding => "branding",
            Self::Terms => "terms",
            Self::Popup => "popup",
            Self::Commission => "commission",
        }
    }
}

impl FromStr for SettingsSection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_segment() == s)
            .ok_or_else(|| crate::Error::NotFound {
                resource: format!("settings section '{s}'"),
            })
    }
}

/// Pagination state carried by list responses
///
/// `page` is 1-based and `pages = ceil(total / limit)`. Nothing here clamps
/// `page` into `1..=pages`; that is up to whoever issues the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total number of rows across all pages
    pub total: u64,
    /// Total number of pages
    pub pages: u32,
}

impl PaginationState {
    /// Build pagination state, deriving `pages` from `total` and `limit`
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: crate::utils::page_count(total, limit),
        }
    }

    /// Zero-based offset of the first row on the current page
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }
}

/// JSON envelope used by every admin endpoint
///
/// `{ success, data?, pagination?, error?, message? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request succeeded
    pub success: bool,

    /// Response payload; a missing field reads as `None` without a
    /// `T: Default` bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Pagination for list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationState>,

    /// Error description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Informational message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful response
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            error: None,
            message: None,
        }
    }

    /// Create a successful paginated response
    pub const fn paginated(data: T, pagination: PaginationState) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: Some(pagination),
            error: None,
            message: None,
        }
    }

    /// Create a failed response
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            pagination: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Attach an informational message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Best available failure description (`error`, then `message`)
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}
