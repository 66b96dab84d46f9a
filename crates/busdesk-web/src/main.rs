//! Web server for the busdesk admin pages
#![forbid(unsafe_code)]

use busdesk_core::{Config, context_error, context_error::Result, init_logging};
use busdesk_web::build_app;
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    // Get configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    init_logging(&config.logging)?;

    if config.web.api_base_url.is_empty() {
        warn!("web.api_base_url is empty, list pages will fail to load");
    }

    let app = build_app(config.clone());

    let host: IpAddr = config
        .web
        .host
        .parse()
        .map_err(|e| context_error!("Invalid web server host '{}': {}", config.web.host, e))?;
    let addr = SocketAddr::new(host, config.web.port);

    info!(api = %config.web.api_base_url, "Starting busdesk web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| context_error!("Server error: {}", e))?;

    Ok(())
}
