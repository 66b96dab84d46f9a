//! Custom extractors for request processing

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use busdesk_core::utils::normalize_search;
use validator::Validate;

/// Default page when the query omits one
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the query omits one
pub const DEFAULT_LIMIT: u32 = 10;

/// Paging, search and passthrough filters of a list request
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ListParams {
    /// 1-based page
    #[validate(range(min = 1, max = 10000))]
    pub page: u32,
    /// Rows per page
    #[validate(range(min = 1, max = 1000))]
    pub limit: u32,
    /// Trimmed search term, `None` when blank
    pub search: Option<String>,
    /// Every other query pair, in request order
    pub filters: Vec<(String, String)>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            filters: Vec::new(),
        }
    }
}

impl ListParams {
    /// Parse and validate a raw query string
    ///
    /// # Errors
    ///
    /// [`ApiError::BadRequest`] when the query is malformed or `page`/`limit`
    /// are not integers in range.
    pub fn parse(query: &str) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {e}")))?;

        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = parse_number("page", &value)?,
                "limit" => params.limit = parse_number("limit", &value)?,
                "search" => params.search = normalize_search(Some(&value)).map(str::to_string),
                _ => params.filters.push((key, value)),
            }
        }

        params.validate().map_err(|errors| {
            let mut fields: Vec<String> =
                errors.field_errors().keys().map(ToString::to_string).collect();
            fields.sort();
            ApiError::BadRequest(format!("Invalid query parameters: {}", fields.join(", ")))
        })?;
        Ok(params)
    }

    /// Query pairs forwarded when the upstream paginates itself
    #[must_use]
    pub fn passthrough(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

fn parse_number(field: &str, value: &str) -> Result<u32, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {field}: expected a positive integer")))
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query().unwrap_or_default())
    }
}
