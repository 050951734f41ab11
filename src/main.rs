//! Access Gate - Demo Server Entry Point
//!
//! Serves a couple of endpoints behind the access gate so the middleware can
//! be exercised end to end.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Authentication**: allowed origin + API key, then a signed session cookie
//! - **Tokens**: HS256 JSON Web Tokens
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the gate from that configuration
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use access_gate::{ServerConfig, app, create_gate};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let gate_config = config.gate_config()?;
    if config.allowed_origins.is_none() {
        tracing::warn!("ALLOWED_ORIGINS is not set; every gated request will be denied");
    }
    let gate = create_gate(gate_config);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(gate)).await?;

    Ok(())
}
