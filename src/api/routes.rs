//! Router and shared application state.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::chat;
use crate::agent::Agent;
use crate::config::Config;
use crate::llm::LlmError;

/// State shared by all handlers. Read-only after startup.
pub struct AppState {
    pub agent: Arc<Agent>,
}

impl AppState {
    /// Build the state with the default upstream client and tools.
    pub fn new(config: Config) -> Result<Self, LlmError> {
        let agent = Agent::new(Arc::new(config))?;
        Ok(Self::with_agent(agent))
    }

    /// Build the state around an existing agent, e.g. one assembled with
    /// `Agent::with_parts`.
    pub fn with_agent(agent: Agent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}

/// Build the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(chat::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/tools", get(chat::list_tools))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
