// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Preview Gate Service
//!
//! Serves the built landing page and the private preview API.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables; see
//! [`preview_gate::config`] for the full list. The most important are:
//!
//! - `PREVIEW_ACCESS_KEY`: shared key; both endpoints answer 503 without it
//! - `PREVIEW_RATE_LIMIT_MAX`: requests per client per window (default: 30)
//! - `PREVIEW_TRUST_FORWARDED_FOR`: set to `false` unless a trusted proxy
//!   overwrites `X-Forwarded-For`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use preview_gate::{build_router, AppState, Config};

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

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        preview_enabled = !config.preview.access_key.is_empty(),
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        trust_forwarded_for = config.client_ip.trust_forwarded_for,
        static_dir = %config.static_files.dir.display(),
        "Starting preview gate"
    );
    if config.preview.access_key.is_empty() {
        warn!("PREVIEW_ACCESS_KEY is not set; preview endpoints will answer 503");
    }

    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = Arc::new(AppState::new(config)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
