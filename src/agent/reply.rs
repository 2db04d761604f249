//! Single-turn reply generation.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use super::prompt::build_messages;
use super::{AgentError, ChatReply, ReplyOptions};
use crate::config::Config;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient, LlmError, YandexGptClient};
use crate::tools::{ToolError, ToolRegistry};

/// Translates a conversation history into one upstream request/response cycle.
pub struct Agent {
    config: Arc<Config>,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    /// Create an agent backed by the Yandex GPT client and the built-in tools.
    pub fn new(config: Arc<Config>) -> Result<Self, LlmError> {
        let llm = Arc::new(YandexGptClient::new(&config)?);
        let tools = Arc::new(ToolRegistry::with_defaults());
        Ok(Self::with_parts(config, llm, tools))
    }

    /// Create an agent from explicit parts.
    pub fn with_parts(
        config: Arc<Config>,
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self { config, llm, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Generate a reply to `history`, applying per-request `options`.
    ///
    /// # Errors
    ///
    /// - `AgentError::EmptyHistory` if `history` is empty
    /// - `AgentError::Upstream` on network failure, timeout or non-2xx status
    /// - `AgentError::Parse` if the upstream body lacks the reply text
    pub async fn generate_reply(
        &self,
        history: &[ChatMessage],
        options: &ReplyOptions,
    ) -> Result<ChatReply, AgentError> {
        if history.is_empty() {
            return Err(AgentError::EmptyHistory);
        }

        let request = self.build_request(history, options);
        let started = Instant::now();

        tracing::debug!(
            model = %request.model_uri,
            messages = request.messages.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "Calling upstream"
        );

        let completion = self.llm.complete(&request).await?;

        tracing::info!(
            model = %request.model_uri,
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = ?completion.finish_reason,
            total_tokens = ?completion.usage.map(|u| u.total_tokens),
            "Generated reply"
        );

        Ok(ChatReply {
            text: completion.text,
            usage: completion.usage,
            finish_reason: completion.finish_reason,
            model_version: completion.model_version,
        })
    }

    /// Merge request options over the configured defaults.
    fn build_request(&self, history: &[ChatMessage], options: &ReplyOptions) -> CompletionRequest {
        let model_uri = match options.model.as_deref() {
            Some(model) => self.config.resolve_model(model),
            None => self.config.model_uri(),
        };

        CompletionRequest {
            model_uri,
            temperature: options
                .temperature
                .unwrap_or(self.config.generation.temperature),
            max_tokens: options
                .max_tokens
                .unwrap_or(self.config.generation.max_tokens),
            messages: build_messages(
                self.config.system_prompt.as_deref(),
                options.user_profile.as_ref(),
                history,
                Utc::now(),
            ),
        }
    }

    /// Run a registered tool by name.
    pub async fn invoke_tool(&self, name: &str, args: Value) -> Result<String, ToolError> {
        tracing::debug!(tool = %name, "Invoking tool");
        self.tools.execute(name, args).await
    }
}
