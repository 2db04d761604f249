//! Chat Gateway - HTTP Server Entry Point
//!
//! Loads configuration and starts the HTTP server. A missing required
//! variable aborts startup before any socket is bound.

use chat_gateway::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Loaded configuration: model={} timeout={:?}",
        config.model_uri(),
        config.request_timeout
    );

    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(config).await?;

    Ok(())
}
