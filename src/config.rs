//! Configuration management for the chat gateway.
//!
//! Configuration is read from environment variables (a `.env` file in the
//! working directory is loaded first, if present):
//! - `YANDEX_API_KEY` - Required. API key for Yandex Foundation Models.
//! - `YANDEX_FOLDER_ID` - Required. Cloud folder the requests are billed to.
//! - `YANDEX_MODEL` - Optional. Model name. Defaults to `yandexgpt-lite`.
//! - `YANDEX_MODEL_URI` - Optional. Full model URI, overrides `YANDEX_MODEL`.
//! - `YANDEX_SYSTEM_PROMPT` - Optional. System prompt prepended to every conversation.
//! - `YANDEX_TEMPERATURE` - Optional. Sampling temperature (0..=1). Defaults to `0.3`.
//! - `YANDEX_MAX_TOKENS` - Optional. Completion token limit. Defaults to `800`.
//! - `YANDEX_COMPLETION_URL` - Optional. Completion endpoint override.
//! - `REQUEST_TIMEOUT` - Optional. Upstream timeout in seconds. Defaults to `30`.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default Yandex Foundation Models completion endpoint.
pub const DEFAULT_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

pub const DEFAULT_MODEL: &str = "yandexgpt-lite";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Default generation parameters, overridable per request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature in `0.0..=1.0`
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

/// Gateway configuration. Loaded once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    /// Yandex Cloud API key
    pub api_key: String,

    /// Yandex Cloud folder identifier
    pub folder_id: String,

    /// Model name (e.g. `yandexgpt-lite`, `yandexgpt/latest`)
    pub model: String,

    /// Full model URI; takes precedence over `model` when set
    pub model_uri: Option<String>,

    /// Optional system prompt
    pub system_prompt: Option<String>,

    /// Default generation parameters
    pub generation: GenerationConfig,

    /// Upstream completion endpoint
    pub completion_url: String,

    /// Timeout for a single upstream call
    pub request_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("folder_id", &self.folder_id)
            .field("model", &self.model)
            .field("model_uri", &self.model_uri)
            .field("system_prompt", &self.system_prompt)
            .field("generation", &self.generation)
            .field("completion_url", &self.completion_url)
            .field("request_timeout", &self.request_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `YANDEX_API_KEY` or
    /// `YANDEX_FOLDER_ID` is not set, and `ConfigError::InvalidValue` if an
    /// optional variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are treated as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let api_key = required("YANDEX_API_KEY")?;
        let folder_id = required("YANDEX_FOLDER_ID")?;

        let model = var("YANDEX_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let model_uri = var("YANDEX_MODEL_URI");
        let system_prompt = var("YANDEX_SYSTEM_PROMPT");

        let defaults = GenerationConfig::default();
        let temperature = var("YANDEX_TEMPERATURE")
            .map(|v| parse_value::<f32>("YANDEX_TEMPERATURE", &v))
            .transpose()?
            .unwrap_or(defaults.temperature);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue(
                "YANDEX_TEMPERATURE".to_string(),
                format!("{} is outside 0..=1", temperature),
            ));
        }

        let max_tokens = var("YANDEX_MAX_TOKENS")
            .map(|v| parse_value::<u32>("YANDEX_MAX_TOKENS", &v))
            .transpose()?
            .unwrap_or(defaults.max_tokens);
        if max_tokens == 0 {
            return Err(ConfigError::InvalidValue(
                "YANDEX_MAX_TOKENS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let timeout_secs = var("REQUEST_TIMEOUT")
            .map(|v| parse_value::<f64>("REQUEST_TIMEOUT", &v))
            .transpose()?
            .unwrap_or(30.0);
        let request_timeout = Duration::try_from_secs_f64(timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REQUEST_TIMEOUT".to_string(),
                    "must be a positive number of seconds".to_string(),
                )
            })?;

        let completion_url =
            var("YANDEX_COMPLETION_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string());

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = var("PORT")
            .map(|v| parse_value::<u16>("PORT", &v))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            api_key,
            folder_id,
            model,
            model_uri,
            system_prompt,
            generation: GenerationConfig {
                temperature,
                max_tokens,
            },
            completion_url,
            request_timeout,
            host,
            port,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, folder_id: String, completion_url: String) -> Self {
        Self {
            api_key,
            folder_id,
            model: DEFAULT_MODEL.to_string(),
            model_uri: None,
            system_prompt: None,
            generation: GenerationConfig::default(),
            completion_url,
            request_timeout: Duration::from_secs(30),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Model URI sent upstream: the explicit URI, or `gpt://{folder}/{model}`.
    pub fn model_uri(&self) -> String {
        match &self.model_uri {
            Some(uri) => uri.clone(),
            None => self.resolve_model(&self.model),
        }
    }

    /// Resolve a model name or URI against this folder.
    pub fn resolve_model(&self, model: &str) -> String {
        if model.contains("://") {
            model.to_string()
        } else {
            format!("gpt://{}/{}", self.folder_id, model)
        }
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
}
