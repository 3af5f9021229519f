//! AgriNode Bridge
//!
//! Polls an AgriNode gateway for agricultural sensor readings and republishes
//! them as entities, one per sensor and measurement type.

mod api;
mod bridge;
mod config;
mod entity;
mod error;
mod gateway;
mod models;

use std::net::SocketAddr;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bridge::Bridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrinode_bridge=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting AgriNode bridge...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!(
        "Configuration loaded (gateway {}:{}, interval {}s)",
        config.gateway.host,
        config.gateway.port,
        config.poller.scan_interval_secs
    );

    let bridge = match Bridge::setup(&config.gateway, &config.poller).await {
        Ok(bridge) => bridge,
        Err(e) => {
            tracing::error!("Setup failed: {}", e);
            return Err(e.into());
        }
    };
    let state = bridge.state();
    tracing::info!("{} ready with {} entities", state.entry.title, state.projector.len().await);

    let app = api::routes().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
