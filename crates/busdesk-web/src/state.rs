//! Application state management

use crate::api_client::ApiClient;
use busdesk_core::Config;

/// Application state holding configuration and the proxy client
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Client for the admin proxy, without a caller token
    pub api_client: ApiClient,
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(config: Config) -> Self {
        let api_client = ApiClient::new(config.web.api_base_url.clone());
        Self { config, api_client }
    }

    /// Proxy client acting on behalf of a caller
    #[must_use]
    pub fn client_for(&self, token: Option<&str>) -> ApiClient {
        match token {
            Some(token) => self.api_client.clone().with_token(token),
            None => self.api_client.clone(),
        }
    }
}
