//! HTTP+JSON surface for the gateway.

pub mod handlers;

pub use handlers::{AppState, HistoryResponse};

use crate::gateway::Gateway;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

/// Build the router with every endpoint
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/api/terminal/execute", post(handlers::execute))
        .route("/api/git/commit", post(handlers::commit))
        .route("/api/git/push", post(handlers::push))
        .route("/api/git/history", get(handlers::history))
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { gateway })
}

/// Serve until Ctrl-C
#[instrument(skip(gateway))]
pub async fn serve(addr: SocketAddr, gateway: Arc<Gateway>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("gitdeck listening on {}", listener.local_addr()?);

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
