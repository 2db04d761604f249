//! Agent module - turns a conversation into one upstream completion.
//!
//! The agent:
//! 1. Merges per-request options over the configured defaults
//! 2. Prepends system context (prompt, current time, caller profile)
//! 3. Performs a single upstream call
//! 4. Maps the completion into a `ChatReply`

mod prompt;
mod reply;

pub use prompt::build_messages;
pub use reply::Agent;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::llm::{LlmError, TokenUsage};

/// Per-request overrides of the configured generation defaults.
#[derive(Debug, Clone, Default)]
pub struct ReplyOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Model name or full `gpt://` URI
    pub model: Option<String>,
    /// Caller profile forwarded as system context
    pub user_profile: Option<Value>,
}

/// A generated reply with optional metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub model_version: Option<String>,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("conversation history is empty")]
    EmptyHistory,

    /// Network failure, timeout or non-success status from the upstream.
    #[error(transparent)]
    Upstream(LlmError),

    /// The upstream answered but the reply could not be extracted.
    #[error("unexpected upstream response: {0}")]
    Parse(String),
}

impl AgentError {
    /// Whether the upstream call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            AgentError::Upstream(LlmError::Transport {
                timed_out: true,
                ..
            })
        )
    }
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(message) => AgentError::Parse(message),
            other => AgentError::Upstream(other),
        }
    }
}
