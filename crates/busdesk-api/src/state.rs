//! Application state management

use crate::upstream::UpstreamClient;
use busdesk_core::{Config, context_error, context_error::Result};
use std::time::Instant;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Client for the upstream ticketing API
    pub upstream: UpstreamClient,
    /// When the server started
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the upstream
    /// client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| context_error!("Invalid configuration: {}", e))?;
        let upstream = UpstreamClient::new(&config.upstream)
            .map_err(|e| context_error!("Failed to build upstream client: {}", e))?;

        Ok(Self {
            config,
            upstream,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was created
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
