// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! NITRON FLOW Contact Intake Service
//!
//! Receives contact form submissions from the site and runs them through
//! the intake pipeline:
//!
//! - 5 submit attempts per minute per client (default)
//! - Field validation with per-field error messages
//! - Sanitization of every accepted field
//! - Delivery to a webhook, or to the log when none is configured
//!
//! It also answers URL safety checks for portfolio embeds.
//!
//! ## Configuration
//!
//! Configuration is read from an optional `intake.toml` and from `INTAKE_*`
//! environment variables (a `.env` file is honoured):
//!
//! - `INTAKE_BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `INTAKE_RATE_LIMIT__MAX_ATTEMPTS`: Attempts per window (default: 5)
//! - `INTAKE_RATE_LIMIT__WINDOW_MS`: Window length (default: 60000)
//! - `INTAKE_TRANSPORT__WEBHOOK_URL`: Delivery endpoint (default: log only)
//! - `INTAKE_URL_GUARD__ORIGIN`: Origin relative URLs resolve against

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nitron_intake::{
    config::Config,
    handlers::{router, AppState},
    transport::ConfiguredTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    let transport = ConfiguredTransport::from_config(&config.transport);
    info!(
        bind_addr = %config.bind_addr,
        max_attempts = config.rate_limit.max_attempts,
        window_ms = config.rate_limit.window_ms,
        transport = transport.kind(),
        host_fallback = config.submission.allow_host_fallback,
        "Starting contact intake service"
    );

    let state = Arc::new(AppState::new(config.clone(), transport)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.window_duration();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            cleanup_state.orchestrator.limiter().cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
