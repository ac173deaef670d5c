use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::cli::open_store;
use crate::config::AppConfig;
use crate::services::{LocalFileStorage, MapQuestGeocoder};
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let store = open_store(&config).await?;
    let geocoder = Arc::new(MapQuestGeocoder::new(&config.geocoder));
    let files = Arc::new(LocalFileStorage::new(config.uploads.file_upload_path.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(store, geocoder, files, config);
    let app = crate::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("DevCamper API listening on http://{}", bind_addr);

    // Peer address feeds the per-client rate limiter
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
