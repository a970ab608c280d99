//! Classroom Relay - Main entry point
//!
//! Loads configuration from the environment, sets up logging and metrics,
//! and serves the relay router.

use anyhow::Result;
use classroom_relay::{
    build_router,
    core::{init_metrics, init_tracing, AppConfig},
    services::build_http_client,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;

    if config.upstream.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail with 500");
    }
    if config.access_gate_enabled() {
        tracing::info!("Access gate enabled (x-app-token required)");
    } else {
        tracing::info!("Access gate disabled; endpoint is open");
    }
    tracing::info!(
        guardrails = config.guardrails.enabled,
        plain_math_note = config.formatting.plain_math_note,
        cleanup = config.formatting.cleanup,
        upstream = %config.upstream.api_base,
        "Relay configuration loaded"
    );

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST '{}': {}", config.server.host, e))?;
    let addr = SocketAddr::new(host, config.server.port);

    let http_client = build_http_client(&config)?;
    let state = Arc::new(AppState::new(config, http_client));
    let app = build_router(state);

    tracing::info!("Starting Classroom Relay on {}", addr);
    tracing::info!("Generate endpoint: /api/generate");
    tracing::info!("Metrics endpoint: /metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
