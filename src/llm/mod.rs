//! LLM client abstraction.
//!
//! Provides a trait for talking to the upstream generation API, so the agent
//! can be exercised against substitutes in tests.

mod yandex;

pub use yandex::YandexGptClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One fully-resolved upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model_uri: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Token accounting reported by the upstream.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Parsed upstream completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
    pub model_version: Option<String>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    /// The upstream could not be reached or did not answer in time.
    #[error("upstream request failed: {message}")]
    Transport { message: String, timed_out: bool },

    /// The upstream answered with a non-success status.
    #[error("upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream answered 2xx but the body had an unexpected shape.
    #[error("unexpected upstream response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Transport {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// Upstream text generation API.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Perform one completion call.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_user() {
        let msg: ChatMessage = serde_json::from_str(r#"{"content": "hi"}"#).unwrap();
        assert_eq!(msg, ChatMessage::user("hi"));
    }

    #[test]
    fn unknown_role_rejected() {
        let res = serde_json::from_str::<ChatMessage>(r#"{"role": "tool", "content": "x"}"#);
        assert!(res.is_err());
    }
}
