//! Faultrix gateway entry point.
//!
//! Loads configuration, builds the upstream client, and serves the Axum app
//! until SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use faultrix_core::HttpUpstream;
use faultrix_server::app::build_router;
use faultrix_server::config::GatewayConfig;
use faultrix_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        upstream = %config.upstream_url,
        environment = ?config.environment,
        timeout_secs = config.upstream_timeout.as_secs(),
        static_dir = ?config.static_dir,
        "Faultrix gateway starting"
    );

    let upstream = HttpUpstream::new(&config.upstream_url, config.upstream_timeout)
        .context("invalid upstream configuration (check BACKEND_URL)")?;

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, Arc::new(upstream)));
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!(addr = %bind_addr, "Faultrix gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Faultrix gateway stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
