// Main entry point - Dependency injection, polling task and snapshot server
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::poller::DashboardPoller;
use crate::application::presenter::Presenter;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_backend::HttpBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;
use crate::presentation::snapshot::SnapshotSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create backend client (infrastructure layer)
    let backend = Arc::new(HttpBackend::new(&config.base_url, config.request_timeout())?);

    // Create presenter and poller (application layer)
    let surface = SnapshotSurface::new();
    let snapshots = surface.subscribe();
    let mut poller = DashboardPoller::new(
        backend,
        Presenter::from_config(&config),
        surface,
        Arc::new(SystemClock),
        config.refresh_interval(),
        config.history_limit,
    );

    tokio::spawn(async move {
        poller.initialize().await;
        poller.run().await;
    });

    // Build router (presentation layer)
    let state = Arc::new(AppState { snapshots });
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr {}", config.listen_addr))?;
    tracing::info!(
        "Polling {} every {}ms; serving snapshots on {}",
        config.base_url,
        config.refresh_interval_ms,
        addr
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
