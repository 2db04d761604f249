//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::ReplyOptions;
use crate::llm::{ChatMessage, TokenUsage};
use crate::tools::ToolInfo;

fn default_channel() -> String {
    "web".to_string()
}

/// Request to generate a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Conversation history, oldest first
    pub messages: Vec<ChatMessage>,

    /// Optional temperature override (0..=1)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Optional completion token limit override
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Optional model override (model name or full `gpt://` URI)
    #[serde(default)]
    pub model: Option<String>,

    /// Caller's conversation id; echoed back, generated when absent
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Originating channel (web, telegram, ...)
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Caller's user id, used for logging only
    #[serde(default)]
    pub user_id: Option<i64>,

    /// Free-form caller profile forwarded to the model as context
    #[serde(default)]
    pub user_profile: Option<Value>,
}

/// A single failed field check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field (e.g. `messages[2].content`)
    pub field: String,

    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ChatRequest {
    /// Check constraints serde cannot express. Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.messages.is_empty() {
            errors.push(FieldError::new(
                "messages",
                "must contain at least one message",
            ));
        }

        for (i, message) in self.messages.iter().enumerate() {
            if message.content.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("messages[{}].content", i),
                    "must not be empty",
                ));
            }
        }

        if let Some(t) = self.temperature {
            if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                errors.push(FieldError::new("temperature", "must be between 0 and 1"));
            }
        }

        if self.max_tokens == Some(0) {
            errors.push(FieldError::new("max_tokens", "must be at least 1"));
        }

        if matches!(&self.model, Some(m) if m.trim().is_empty()) {
            errors.push(FieldError::new("model", "must not be blank"));
        }

        if matches!(&self.chat_id, Some(id) if id.trim().is_empty()) {
            errors.push(FieldError::new("chat_id", "must not be blank"));
        }

        if self.channel.trim().is_empty() {
            errors.push(FieldError::new("channel", "must not be blank"));
        }

        if matches!(&self.user_profile, Some(p) if !p.is_object() && !p.is_null()) {
            errors.push(FieldError::new("user_profile", "must be an object"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Per-request overrides handed to the agent.
    pub fn reply_options(&self) -> ReplyOptions {
        ReplyOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            model: self.model.clone(),
            user_profile: self.user_profile.clone(),
        }
    }
}

/// Successful chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text, unchanged from the upstream
    pub reply: String,

    pub chat_id: String,

    pub channel: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Registered tools.
#[derive(Debug, Clone, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}
