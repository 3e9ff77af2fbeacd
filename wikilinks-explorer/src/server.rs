use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use wikilinks_core::LinkGraph;

use crate::{AppState, ExplorerError, router};

/// Serve the explorer on `addr` until Ctrl-C is received.
pub async fn serve(
    addr: SocketAddr,
    graph: Arc<dyn LinkGraph + Send + Sync>,
) -> Result<(), ExplorerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ExplorerError::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);
    tracing::info!(%local, "explorer listening on http://{local}/");
    axum::serve(listener, router(AppState::new(graph)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ExplorerError::Serve { source })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down explorer");
}
