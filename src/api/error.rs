//! Mapping of request failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::types::FieldError;
use crate::agent::AgentError;
use crate::llm::LlmError;

/// Error payload: `{"error": {...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_body: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid request body.
    Validation(Vec<FieldError>),

    /// Reply generation failed.
    Agent(AgentError),
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError::Agent(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Agent(AgentError::EmptyHistory) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Agent(AgentError::Upstream(LlmError::Status { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Agent(AgentError::Upstream(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Agent(AgentError::Parse(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        let mut body = ErrorBody {
            code: "validation_error",
            message: String::new(),
            upstream_status: None,
            upstream_body: None,
            fields: Vec::new(),
        };

        match self {
            ApiError::Validation(fields) => {
                body.message = "Request body failed validation".to_string();
                body.fields = fields;
            }
            ApiError::Agent(AgentError::EmptyHistory) => {
                body.message = "Request body failed validation".to_string();
                body.fields = vec![FieldError::new(
                    "messages",
                    "must contain at least one message",
                )];
            }
            ApiError::Agent(err @ AgentError::Upstream(LlmError::Transport { .. })) => {
                body.code = if err.is_timeout() {
                    "upstream_timeout"
                } else {
                    "upstream_unavailable"
                };
                body.message = err.to_string();
            }
            ApiError::Agent(AgentError::Upstream(LlmError::Status { status, body: text })) => {
                body.code = "upstream_error";
                body.message = format!("Upstream responded with status {}", status);
                body.upstream_status = Some(status);
                body.upstream_body = Some(text);
            }
            ApiError::Agent(err @ AgentError::Upstream(LlmError::Parse(_)))
            | ApiError::Agent(err @ AgentError::Parse(_)) => {
                body.code = "upstream_parse_error";
                body.message = err.to_string();
            }
        }

        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { error: self.body() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_status(code: u16) -> ApiError {
        ApiError::Agent(AgentError::Upstream(LlmError::Status {
            status: code,
            body: "{\"error\":\"boom\"}".to_string(),
        }))
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(upstream_status(500).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream_status(401).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::Agent(AgentError::Upstream(LlmError::Transport {
                message: "connection refused".to_string(),
                timed_out: false,
            }))
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Agent(AgentError::Parse("missing text".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_body_carried_through() {
        let body = upstream_status(429).body();
        assert_eq!(body.code, "upstream_error");
        assert_eq!(body.upstream_status, Some(429));
        assert_eq!(body.upstream_body.as_deref(), Some("{\"error\":\"boom\"}"));
    }

    #[test]
    fn timeout_has_own_code() {
        let err = ApiError::Agent(AgentError::Upstream(LlmError::Transport {
            message: "operation timed out".to_string(),
            timed_out: true,
        }));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body().code, "upstream_timeout");
    }
}
