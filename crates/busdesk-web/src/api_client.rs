//! HTTP client for the `/api/admin/*` proxy

use busdesk_core::{AdminResource, ApiEnvelope, PaginationState, SettingsSection};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Failures surfaced by [`ApiClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text from the envelope, or the status reason
        message: String,
    },

    /// The envelope reported `success: false`
    #[error("{message}")]
    Rejected {
        /// Error text from the envelope
        message: String,
    },

    /// The body was not a valid envelope
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result alias for client calls
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// A bulk call that stopped at its first failure
#[derive(Debug, Error)]
#[error("{source} ({} of {total} applied)", .applied.len())]
pub struct BulkError {
    /// Ids processed before the failure, in request order
    pub applied: Vec<String>,
    /// Number of ids requested
    pub total: usize,
    /// Failure that stopped the batch
    pub source: ClientError,
}

impl BulkError {
    fn at(ids: &[String], done: usize, source: ClientError) -> Self {
        Self {
            applied: ids.iter().take(done).cloned().collect(),
            total: ids.len(),
            source,
        }
    }
}

/// Query for a list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Free-text search term
    pub search: Option<String>,
    /// Extra filters passed through verbatim
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

impl ListQuery {
    /// Query for one page with no search or filters
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    /// Query as name/value pairs: `page`, `limit`, `search` when set, then
    /// the filters
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }

    /// Encode as a URL query string (without the leading `?`)
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ListData {
    /// Rows of the page
    pub rows: Vec<Value>,
    /// Pagination reported by the server
    pub pagination: Option<PaginationState>,
}

/// API client for the admin proxy
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` on every request
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/admin/{path}", self.base_url);
        debug!(%method, %url, "admin api request");
        let request = self.client.request(method, url);
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn envelope<T: DeserializeOwned>(response: Response) -> ClientResult<ApiEnvelope<T>> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error_message().map(str::to_string))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)?;
        if !envelope.success {
            return Err(ClientError::Rejected {
                message: envelope
                    .error_message()
                    .unwrap_or("request was rejected")
                    .to_string(),
            });
        }
        Ok(envelope)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<ApiEnvelope<T>> {
        let response = request.send().await?;
        Self::envelope(response).await
    }

    /// Fetch one page of `resource`
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the server answers with
    /// an error status, or the envelope is rejected or malformed.
    pub async fn list(&self, resource: AdminResource, query: &ListQuery) -> ClientResult<ListData> {
        let path = format!("{}?{}", resource.as_segment(), query.to_query_string());
        let envelope = self
            .send::<Vec<Value>>(self.request(Method::GET, &path))
            .await?;

        Ok(ListData {
            rows: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination,
        })
    }

    /// Fetch one record
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn get(&self, resource: AdminResource, id: &str) -> ClientResult<Value> {
        let path = format!("{}/{}", resource.as_segment(), urlencoding::encode(id));
        let envelope = self.send(self.request(Method::GET, &path)).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Create a record
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn create(&self, resource: AdminResource, body: &Value) -> ClientResult<Value> {
        let request = self.request(Method::POST, resource.as_segment()).json(body);
        let envelope = self.send(request).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Partially update a record
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn update(&self, resource: AdminResource, id: &str, body: &Value) -> ClientResult<Value> {
        let path = format!("{}/{}", resource.as_segment(), urlencoding::encode(id));
        let envelope = self.send(self.request(Method::PATCH, &path).json(body)).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Delete a record
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn delete(&self, resource: AdminResource, id: &str) -> ClientResult<()> {
        let path = format!("{}/{}", resource.as_segment(), urlencoding::encode(id));
        self.send::<Value>(self.request(Method::DELETE, &path))
            .await
            .map(|_| ())
    }

    /// Delete several records, stopping at the first failure
    ///
    /// # Errors
    ///
    /// A [`BulkError`] naming the ids deleted before the failing one.
    pub async fn delete_many(&self, resource: AdminResource, ids: &[String]) -> Result<(), BulkError> {
        for (done, id) in ids.iter().enumerate() {
            if let Err(e) = self.delete(resource, id).await {
                return Err(BulkError::at(ids, done, e));
            }
        }
        Ok(())
    }

    /// Set `status` on several records, stopping at the first failure
    ///
    /// # Errors
    ///
    /// A [`BulkError`] naming the ids updated before the failing one.
    pub async fn update_status(
        &self,
        resource: AdminResource,
        ids: &[String],
        status: &str,
    ) -> Result<(), BulkError> {
        let body = serde_json::json!({ "status": status });
        for (done, id) in ids.iter().enumerate() {
            if let Err(e) = self.update(resource, id, &body).await {
                return Err(BulkError::at(ids, done, e));
            }
        }
        Ok(())
    }

    /// Read a settings section
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn settings(&self, section: SettingsSection) -> ClientResult<Value> {
        let path = format!("settings/{}", section.as_segment());
        let envelope = self.send(self.request(Method::GET, &path)).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Replace a settings section
    ///
    /// # Errors
    ///
    /// See [`Self::list`].
    pub async fn save_settings(&self, section: SettingsSection, body: &Value) -> ClientResult<Value> {
        let path = format!("settings/{}", section.as_segment());
        let envelope = self.send(self.request(Method::PUT, &path).json(body)).await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
