// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Portfolio Contact Service
//!
//! Serves `POST /contact` for the portfolio site.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first if present). See [`Config::from_env`] for the full list; the
//! most common ones are:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `CONTACT_RECIPIENT`: Where notifications go
//! - `NOTIFIER_URL`: Mail relay endpoint (notifications are only logged when unset)
//! - `RATE_LIMIT_STORE`: `file` (default) or `memory`
//! - `RATE_LIMIT_DIR`: Directory for per-address records

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_contact::{config::Config, handlers, notifier, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        recipient = %config.contact.recipient,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        store = ?config.rate_limit.store,
        relay = config.notifier.webhook_url.is_some(),
        "Starting portfolio contact service"
    );

    let store = store::from_backend(&config.rate_limit.store).await?;
    let notifier = notifier::from_config(&config.notifier);
    let state = Arc::new(handlers::AppState::new(config.clone(), store, notifier)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_state.limiter.cleanup().await {
                warn!(error = %e, "Rate limit cleanup failed");
            }
        }
    });

    let app = handlers::router(state).into_make_service_with_connect_info::<SocketAddr>();

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
