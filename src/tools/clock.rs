//! Current date/time tool.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::Tool;

/// Report the current UTC date and time.
pub struct CurrentTime;

#[async_trait]
impl Tool for CurrentTime {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Return the current date and time in UTC. Use when the answer depends on today's date."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "enum": ["human", "rfc3339"],
                    "description": "Output format (default: human)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let now = Utc::now();
        match args["format"].as_str().unwrap_or("human") {
            "human" => Ok(now.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            "rfc3339" => Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            other => Err(anyhow::anyhow!("Unsupported format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn human_format_ends_with_utc() {
        let out = CurrentTime.execute(Value::Null).await.unwrap();
        assert!(out.ends_with(" UTC"));
        assert_eq!(out.len(), "2024-01-01 00:00:00 UTC".len());
    }

    #[tokio::test]
    async fn rfc3339_parses_back() {
        let out = CurrentTime.execute(json!({"format": "rfc3339"})).await.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&out).is_ok());
    }

    #[tokio::test]
    async fn unknown_format_errors() {
        assert!(CurrentTime.execute(json!({"format": "unix"})).await.is_err());
    }
}
