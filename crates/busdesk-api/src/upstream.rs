//! Client for the upstream ticketing REST API

use crate::error::{ApiError, ApiResult};
use busdesk_core::ApiEnvelope;
use busdesk_core::config::UpstreamConfig;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Response relayed from the upstream
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    /// Upstream status
    pub status: StatusCode,
    /// Upstream JSON body
    pub body: Value,
}

/// Outcome of walking every upstream page
#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    /// Every row fetched
    pub rows: Vec<Value>,
    /// Number of batches requested
    pub batches: u32,
    /// Whether the batch cap stopped the walk early
    pub truncated: bool,
}

/// HTTP client bound to the upstream base URL
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    service_token: Option<String>,
    batch_size: u32,
    max_batches: u32,
}

impl UpstreamClient {
    /// Build a client from the upstream configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_token: config.token.clone().filter(|t| !t.is_empty()),
            batch_size: config.search_batch_size,
            max_batches: config.search_max_pages,
        })
    }

    /// Token used when the caller presented none
    #[must_use]
    pub fn service_token(&self) -> Option<&str> {
        self.service_token.as_deref()
    }

    /// Send a request and relay the upstream answer
    ///
    /// `path` is relative to the base URL and `query` is an encoded query
    /// string without the leading `?`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Timeout`] or [`ApiError::Transport`] when the upstream
    /// cannot be reached, [`ApiError::Upstream`] for non-2xx answers.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> ApiResult<Relayed> {
        let mut url = format!("{}/{path}", self.base_url);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        debug!(%method, %url, "forwarding to upstream");

        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(|body| {
                    body.get("error")
                        .or_else(|| body.get("message"))
                        .and_then(Value::as_str)
                })
                .map_or_else(
                    || {
                        status
                            .canonical_reason()
                            .unwrap_or("Upstream request failed")
                            .to_string()
                    },
                    str::to_string,
                );
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = match parsed {
            Some(body) => body,
            None if bytes.is_empty() => Value::Null,
            None => {
                return Err(ApiError::Transport(
                    "upstream returned a non-JSON body".to_string(),
                ));
            }
        };
        Ok(Relayed { status, body })
    }

    /// Fetch one page of a collection
    ///
    /// # Errors
    ///
    /// See [`Self::forward`]; an unparseable envelope is a transport error
    /// and a `success: false` envelope is an [`ApiError::Upstream`] with a
    /// 502 status.
    pub async fn fetch_page(
        &self,
        path: &str,
        page: u32,
        limit: u32,
        filters: &[(String, String)],
        token: Option<&str>,
    ) -> ApiResult<ApiEnvelope<Vec<Value>>> {
        let mut pairs: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        pairs.extend(filters.iter().map(|(k, v)| (k.as_str(), v.clone())));
        let query = serde_urlencoded::to_string(&pairs)
            .map_err(|e| ApiError::Internal(format!("Failed to encode query: {e}")))?;

        let relayed = self.forward(Method::GET, path, &query, token, None).await?;
        let envelope: ApiEnvelope<Vec<Value>> = serde_json::from_value(relayed.body)
            .map_err(|e| ApiError::Transport(format!("invalid upstream envelope: {e}")))?;
        if !envelope.success {
            let message = envelope
                .error_message()
                .unwrap_or("upstream rejected the request")
                .to_string();
            warn!(path, page, %message, "upstream reported failure");
            return Err(ApiError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message,
            });
        }
        Ok(envelope)
    }

    /// Walk every page of a collection in large batches
    ///
    /// Stops on the last page reported by the upstream, on an empty batch or
    /// at the configured batch cap. Without pagination metadata a short
    /// batch marks the end.
    ///
    /// # Errors
    ///
    /// The first batch error aborts the walk; see [`Self::fetch_page`].
    pub async fn fetch_all(
        &self,
        path: &str,
        filters: &[(String, String)],
        token: Option<&str>,
    ) -> ApiResult<Collected> {
        let mut rows = Vec::new();
        let mut page = 1;

        loop {
            let envelope = self
                .fetch_page(path, page, self.batch_size, filters, token)
                .await?;
            let batch = envelope.data.unwrap_or_default();
            if batch.is_empty() {
                break;
            }
            let full = u32::try_from(batch.len()).is_ok_and(|len| len >= self.batch_size);
            rows.extend(batch);

            let more = match envelope.pagination {
                Some(pagination) => page < pagination.pages,
                None => full,
            };
            if !more {
                break;
            }
            if page >= self.max_batches {
                warn!(
                    path,
                    batches = page,
                    pages = ?envelope.pagination.map(|p| p.pages),
                    fetched = rows.len(),
                    "search batch cap reached, filtering partial result set"
                );
                return Ok(Collected {
                    rows,
                    batches: page,
                    truncated: true,
                });
            }
            page += 1;
        }

        debug!(path, batches = page, fetched = rows.len(), "fetched all upstream pages");
        Ok(Collected {
            rows,
            batches: page,
            truncated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, max_pages: u32) -> UpstreamClient {
        let config = UpstreamConfig {
            base_url: format!("{}/api", server.uri()),
            search_batch_size: 2,
            search_max_pages: max_pages,
            ..UpstreamConfig::default()
        };
        UpstreamClient::new(&config).expect("client")
    }

    fn batch(ids: &[&str], page: u32, total: u64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": ids.iter().map(|id| json!({"_id": id})).collect::<Vec<_>>(),
            "pagination": {"page": page, "limit": 2, "total": total, "pages": total.div_ceil(2)}
        }))
    }

    async fn mount_batches(server: &MockServer) {
        for (page, ids) in [(1, vec!["a", "b"]), (2, vec!["c", "d"]), (3, vec!["e"])] {
            Mock::given(method("GET"))
                .and(path("/api/routes"))
                .and(query_param("page", page.to_string()))
                .and(query_param("limit", "2"))
                .respond_with(batch(&ids, page, 5))
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_fetch_all_walks_every_page() {
        let server = MockServer::start().await;
        mount_batches(&server).await;

        let collected = client(&server, 100)
            .fetch_all("routes", &[], None)
            .await
            .expect("collected");

        assert_eq!(collected.rows.len(), 5);
        assert_eq!(collected.batches, 3);
        assert!(!collected.truncated);
    }

    #[tokio::test]
    async fn test_fetch_all_respects_batch_cap() {
        let server = MockServer::start().await;
        mount_batches(&server).await;

        let collected = client(&server, 2)
            .fetch_all("routes", &[], None)
            .await
            .expect("collected");

        assert_eq!(collected.rows.len(), 4);
        assert!(collected.truncated);
    }

    #[tokio::test]
    async fn test_fetch_all_stops_on_empty_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/routes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let collected = client(&server, 100)
            .fetch_all("routes", &[], None)
            .await
            .expect("collected");

        assert!(collected.rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_without_pagination_reads_until_short_batch() {
        let server = MockServer::start().await;
        for (page, ids) in [(1, vec!["a", "b"]), (2, vec!["c"])] {
            Mock::given(method("GET"))
                .and(path("/api/routes"))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "success": true,
                    "data": ids.iter().map(|id| json!({"_id": id})).collect::<Vec<_>>()
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let collected = client(&server, 100)
            .fetch_all("routes", &[], None)
            .await
            .expect("collected");

        assert_eq!(collected.rows.len(), 3);
        assert_eq!(collected.batches, 2);
        assert!(!collected.truncated);
    }

    #[tokio::test]
    async fn test_fetch_all_surfaces_rejected_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/routes"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "Route service down"})),
            )
            .mount(&server)
            .await;

        let err = client(&server, 100)
            .fetch_all("routes", &[], None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Upstream {
                status: 502,
                message: "Route service down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_forward_sends_token_and_relays_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/buses"))
            .and(header("authorization", "Bearer admin-tok"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {"_id": "bus1"}})),
            )
            .mount(&server)
            .await;

        let relayed = client(&server, 100)
            .forward(
                Method::POST,
                "buses",
                "",
                Some("admin-tok"),
                Some(&json!({"plateNumber": "3-A12345"})),
            )
            .await
            .expect("relayed");

        assert_eq!(relayed.status, StatusCode::CREATED);
        assert_eq!(relayed.body["data"]["_id"], "bus1");
    }

    #[tokio::test]
    async fn test_forward_maps_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/trips/t9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"success": false, "message": "Trip not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server, 100)
            .forward(Method::GET, "trips/t9", "", None, None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Upstream {
                status: 404,
                message: "Trip not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let config = UpstreamConfig {
            base_url: "http://127.0.0.1:1/api".to_string(),
            ..UpstreamConfig::default()
        };
        let err = UpstreamClient::new(&config)
            .expect("client")
            .forward(Method::GET, "users", "", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }
}
