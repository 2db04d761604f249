//! Yandex Foundation Models completion client.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, Completion, CompletionRequest, LlmClient, LlmError, Role, TokenUsage};
use crate::config::Config;

/// Client for the synchronous `foundationModels/v1/completion` endpoint.
pub struct YandexGptClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    folder_id: String,
}

impl YandexGptClient {
    /// Build a client with the configured endpoint, credentials and timeout.
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.completion_url.clone(),
            api_key: config.api_key.clone(),
            folder_id: config.folder_id.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for YandexGptClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let payload = WireRequest::from(request);
        let started = Instant::now();

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .header("x-folder-id", &self.folder_id)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    timed_out = e.is_timeout(),
                    "Upstream request failed (network error)"
                );
                LlmError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        status = %status,
                        error = %e,
                        "Failed to read upstream error body"
                    );
                    String::new()
                }
            };
            tracing::warn!(
                status = %status,
                body = %truncate_for_log(&body, 500),
                "Upstream returned error status"
            );
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(
            model = %request.model_uri,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "Upstream completion received"
        );

        parse_completion(&body)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    model_uri: &'a str,
    completion_options: CompletionOptions,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    text: &'a str,
}

impl<'a> From<&'a CompletionRequest> for WireRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model_uri: &request.model_uri,
            completion_options: CompletionOptions {
                stream: false,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            },
            messages: request.messages.iter().map(WireMessage::from).collect(),
        }
    }
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role,
            text: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    result: Option<WireResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
    usage: Option<WireUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: Option<AlternativeMessage>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlternativeMessage {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsage {
    input_text_tokens: Option<TokenCount>,
    completion_tokens: Option<TokenCount>,
    total_tokens: Option<TokenCount>,
}

/// Token counts arrive as int64-in-string (`"42"`) or plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenCount {
    Number(u64),
    Text(String),
}

impl TokenCount {
    fn value(&self) -> Option<u64> {
        match self {
            TokenCount::Number(n) => Some(*n),
            TokenCount::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl WireUsage {
    fn into_usage(self) -> TokenUsage {
        let count = |c: Option<TokenCount>| c.and_then(|c| c.value()).unwrap_or(0);
        let input_tokens = count(self.input_text_tokens);
        let completion_tokens = count(self.completion_tokens);
        let total_tokens = match self.total_tokens.and_then(|c| c.value()) {
            Some(total) => total,
            None => input_tokens.saturating_add(completion_tokens),
        };
        TokenUsage {
            input_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// Parse a completion response body.
fn parse_completion(body: &[u8]) -> Result<Completion, LlmError> {
    let response: WireResponse = serde_json::from_slice(body)
        .map_err(|e| LlmError::Parse(format!("invalid completion body: {}", e)))?;

    let result = response
        .result
        .ok_or_else(|| LlmError::Parse("missing `result`".to_string()))?;

    let alternative = result
        .alternatives
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("missing `result.alternatives[0]`".to_string()))?;

    let text = alternative
        .message
        .and_then(|m| m.text)
        .ok_or_else(|| {
            LlmError::Parse("missing `result.alternatives[0].message.text`".to_string())
        })?;

    Ok(Completion {
        text,
        finish_reason: alternative.status.as_deref().map(finish_reason),
        usage: result.usage.map(WireUsage::into_usage),
        model_version: result.model_version,
    })
}

/// Map an alternative status to an OpenAI-style finish reason.
fn finish_reason(status: &str) -> String {
    match status {
        "ALTERNATIVE_STATUS_FINAL" => "stop".to_string(),
        "ALTERNATIVE_STATUS_TRUNCATED_FINAL" => "length".to_string(),
        "ALTERNATIVE_STATUS_CONTENT_FILTER" => "content_filter".to_string(),
        other => other
            .strip_prefix("ALTERNATIVE_STATUS_")
            .unwrap_or(other)
            .to_lowercase(),
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_yandex_field_names() {
        let request = CompletionRequest {
            model_uri: "gpt://b1g/yandexgpt-lite".to_string(),
            temperature: 0.3,
            max_tokens: 800,
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
        };
        let value = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(value["modelUri"], "gpt://b1g/yandexgpt-lite");
        assert_eq!(value["completionOptions"]["stream"], false);
        assert_eq!(value["completionOptions"]["maxTokens"], 800);
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "text": "be brief"},
                {"role": "user", "text": "hi"}
            ])
        );
    }

    #[test]
    fn parses_full_response() {
        let body = json!({
            "result": {
                "alternatives": [{
                    "message": {"role": "assistant", "text": "Привет!"},
                    "status": "ALTERNATIVE_STATUS_FINAL"
                }],
                "usage": {"inputTextTokens": "12", "completionTokens": "3", "totalTokens": "15"},
                "modelVersion": "23.10.2024"
            }
        });
        let completion = parse_completion(body.to_string().as_bytes()).unwrap();
        assert_eq!(completion.text, "Привет!");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                input_tokens: 12,
                completion_tokens: 3,
                total_tokens: 15
            })
        );
        assert_eq!(completion.model_version.as_deref(), Some("23.10.2024"));
    }

    #[test]
    fn numeric_usage_and_missing_total() {
        let body = json!({
            "result": {
                "alternatives": [{"message": {"text": "ok"}}],
                "usage": {"inputTextTokens": 4, "completionTokens": 6}
            }
        });
        let completion = parse_completion(body.to_string().as_bytes()).unwrap();
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(10));
        assert_eq!(completion.finish_reason, None);
    }

    #[test]
    fn missing_total_saturates_instead_of_overflowing() {
        let body = json!({
            "result": {
                "alternatives": [{"message": {"text": "ok"}}],
                "usage": {"inputTextTokens": u64::MAX.to_string(), "completionTokens": "1"}
            }
        });
        let completion = parse_completion(body.to_string().as_bytes()).unwrap();
        let usage = completion.usage.unwrap();
        assert_eq!(usage.input_tokens, u64::MAX);
        assert_eq!(usage.total_tokens, u64::MAX);
    }

    #[test]
    fn empty_text_is_a_valid_reply() {
        let body = json!({"result": {"alternatives": [{"message": {"text": ""}}]}});
        let completion = parse_completion(body.to_string().as_bytes()).unwrap();
        assert_eq!(completion.text, "");
    }

    #[test]
    fn missing_text_is_parse_error() {
        let body = json!({"result": {"alternatives": [{"message": {"role": "assistant"}}]}});
        let err = parse_completion(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, LlmError::Parse(ref m) if m.contains("message.text")));
    }

    #[test]
    fn missing_alternatives_is_parse_error() {
        let err = parse_completion(br#"{"result": {}}"#).unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn non_json_is_parse_error() {
        let err = parse_completion(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn finish_reason_mapping() {
        assert_eq!(finish_reason("ALTERNATIVE_STATUS_TRUNCATED_FINAL"), "length");
        assert_eq!(finish_reason("ALTERNATIVE_STATUS_CONTENT_FILTER"), "content_filter");
        assert_eq!(finish_reason("ALTERNATIVE_STATUS_PARTIAL"), "partial");
        assert_eq!(finish_reason("weird"), "weird");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ёёё";
        assert_eq!(truncate_for_log(s, 3), "ё... [truncated]");
        assert_eq!(truncate_for_log("short", 10), "short");
    }
}
