//! Server entrypoint
//!
//! Wires configuration, state, routes, and middleware, then serves until a
//! shutdown signal arrives.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reverie_journal::config::ServerConfig;
use reverie_journal::handlers::{JournalHub, build_protected_routes, build_public_routes};
use reverie_journal::{auth, metrics, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    metrics::register_metrics().expect("Failed to register metrics");
    info!("Metrics registered at /metrics");

    info!("Starting reverie-journal server...");

    // Load configuration from environment
    let server_config = ServerConfig::from_env();
    server_config.log();

    let hub = Arc::new(JournalHub::new(server_config.clone()));

    // Build CORS layer from configuration
    let cors = server_config.cors.to_layer();

    // Protected API routes - bearer auth applied here, admission control
    // happens per-endpoint-class inside the handlers
    let protected_routes = build_protected_routes(hub.clone())
        .layer(axum::middleware::from_fn(auth::auth_middleware));

    // Public routes - health checks and metrics are never gated
    let public_routes = build_public_routes(hub.clone());

    let app = axum::Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(
            server_config.max_concurrent_requests,
        ))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {e}"))?;
    info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
