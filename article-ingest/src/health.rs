//! HTTP liveness endpoint.
//!
//! Serves `GET /health` on its own task. It reports process liveness only and
//! does not check the queue or either store.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Default port of the health server.
pub const DEFAULT_HEALTH_PORT: u16 = 3000;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Create the router with the health route.
pub fn create_app() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Serve the health router on an already bound listener.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Health endpoint: http://{}/health", addr);
    }
    axum::serve(listener, create_app()).await
}

/// Bind `addr` and serve the health router on a background task.
///
/// Binding happens before the task is spawned, so a taken port is reported to
/// the caller instead of being lost in the task.
pub async fn spawn_health_server(addr: SocketAddr) -> std::io::Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr).await?;
    Ok(tokio::spawn(async move {
        if let Err(e) = serve(listener).await {
            error!(error = %e, addr = %addr, "Health server failed");
        }
    }))
}
