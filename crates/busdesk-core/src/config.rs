//! Configuration management for `busdesk`

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "BUSDESK";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Proxy API server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Admin web front configuration
    #[serde(default)]
    pub web: WebConfig,

    /// Upstream ticketing API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Admin web front configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_web_port")]
    pub port: u16,

    /// Base URL of the proxy API the pages read from
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Default page size for list pages
    #[serde(default = "default_page_size")]
    pub default_limit: u32,

    /// Page sizes offered by the page-size selector
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,

    /// Quiet period before a search query is issued, in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

/// Upstream ticketing API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream REST API
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Service token used when the caller supplies none
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,

    /// Batch size used when a search has to walk every upstream page
    #[serde(default = "default_search_batch_size")]
    pub search_batch_size: u32,

    /// Maximum number of batches fetched for a single search
    #[serde(default = "default_search_max_pages")]
    pub search_max_pages: u32,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Reject admin requests that carry no bearer token
    #[serde(default = "default_require_admin")]
    pub require_admin: bool,

    /// Cookie name holding the admin token
    #[serde(default = "default_admin_cookie")]
    pub admin_cookie: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_web_port() -> u16 {
    3000
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

const fn default_page_size() -> u32 {
    10
}

fn default_page_size_options() -> Vec<u32> {
    vec![10, 20, 50, 100]
}

const fn default_search_debounce_ms() -> u64 {
    800
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

const fn default_upstream_timeout() -> u64 {
    30
}

const fn default_search_batch_size() -> u32 {
    1000
}

const fn default_search_max_pages() -> u32 {
    100
}

const fn default_require_admin() -> bool {
    true
}

fn default_admin_cookie() -> String {
    "admin_token".to_string()
}

const fn default_request_timeout() -> u64 {
    60
}

const fn default_enable_cors() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_web_port(),
            api_base_url: default_api_base_url(),
            default_limit: default_page_size(),
            page_size_options: default_page_size_options(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl WebConfig {
    /// Search debounce delay as a [`Duration`]
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            token: None,
            timeout_secs: default_upstream_timeout(),
            search_batch_size: default_search_batch_size(),
            search_max_pages: default_search_max_pages(),
        }
    }
}

impl UpstreamConfig {
    /// Upstream request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_admin: default_require_admin(),
            admin_cookie: default_admin_cookie(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: default_enable_cors(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `config.toml` (optional) and `BUSDESK__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(Path::new("config"))
    }

    /// Load configuration from a specific file stem or path
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let name = path.to_string_lossy();
        let config = config::Config::builder()
            .add_source(config::File::with_name(&name).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins")
                    .with_list_parse_key("web.page_size_options")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        debug!(source = %name, upstream = %config.upstream.base_url, "configuration loaded");
        Ok(config)
    }

    /// Check the configuration for values the servers cannot work with
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(crate::Error::Validation {
                field: "upstream.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.upstream.search_batch_size == 0 {
            return Err(crate::Error::Validation {
                field: "upstream.search_batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.upstream.search_max_pages == 0 {
            return Err(crate::Error::Validation {
                field: "upstream.search_max_pages".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.web.default_limit == 0 || self.web.page_size_options.contains(&0) {
            return Err(crate::Error::Validation {
                field: "web.page_size_options".to_string(),
                message: "page sizes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
