//! `burnbox` — one-time secret sharing service.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP export).
//! 3. Connect the selected secret store backend and verify it answers.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod crypto;
mod server;
mod service;
mod store;
mod telemetry;
mod token;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;
use server::state::AppState;
use service::SecretService;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = cfg.store_backend.as_str(),
        listen_port = cfg.listen_port,
        "burnbox starting"
    );

    // -----------------------------------------------------------------------
    // 3. Secret store
    // -----------------------------------------------------------------------
    let store = store::connect(&cfg)
        .await
        .context("failed to connect the secret store")?;
    store
        .ping()
        .await
        .context("secret store did not answer the startup probe")?;

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(SecretService::new(store), cfg.store_backend);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
