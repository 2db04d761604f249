//! HTTP API.
//!
//! - `POST /api/chat` - generate a reply for a conversation
//! - `GET /api/tools` - list registered tools
//! - `GET /health` - liveness check
//!
//! No authentication is enforced here; put the gateway behind a reverse proxy.

mod chat;
pub mod error;
mod routes;
pub mod types;

pub use routes::{router, AppState};

use std::sync::Arc;

use crate::config::Config;

/// Bind `config.host:config.port` and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
