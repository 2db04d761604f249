//! Tool registry for future function calling.
//!
//! Tools are registered once at startup and shared read-only afterwards.
//! Names are unique: `register` rejects a duplicate, `replace` overwrites.

mod clock;

pub use clock::CurrentTime;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A callable the agent can expose to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool {name} failed: {source}")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Public description of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tools.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.replace(Arc::new(CurrentTime));
        registry
    }

    /// Register a tool under its name.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::AlreadyRegistered` if the name is taken; the
    /// existing registration is left untouched.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Rejected duplicate tool registration");
            return Err(ToolError::AlreadyRegistered(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Register a tool, overwriting any tool with the same name.
    /// Returns the previous tool, if there was one.
    pub fn replace(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        if previous.is_some() {
            tracing::info!(tool = %name, "Replaced tool");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Describe all registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Look up a tool by name and run it.
    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(args).await.map_err(|source| ToolError::Failed {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo {
        name: &'static str,
        prefix: &'static str,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echo the `text` argument"
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            let text = args["text"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Missing 'text' argument"))?;
            Ok(format!("{}{}", self.prefix, text))
        }
    }

    fn echo(prefix: &'static str) -> Arc<dyn Tool> {
        Arc::new(Echo { name: "echo", prefix })
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("first:")).unwrap();

        let err = registry.register(echo("second:")).unwrap_err();
        assert!(matches!(err, ToolError::AlreadyRegistered(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);

        // First registration still answers.
        let out = registry.execute("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, "first:hi");
    }

    #[tokio::test]
    async fn replace_overwrites_deterministically() {
        let mut registry = ToolRegistry::new();
        assert!(registry.replace(echo("first:")).is_none());
        let previous = registry.replace(echo("second:"));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);

        let out = registry.execute("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, "second:hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
        let err = registry.execute("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref n) if n == "missing"));
    }

    #[tokio::test]
    async fn tool_failure_is_wrapped() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("")).unwrap();
        let err = registry.execute("echo", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed { ref name, .. } if name == "echo"));
    }

    #[test]
    fn list_tools_sorted_by_name() {
        let mut registry = ToolRegistry::with_defaults();
        registry.register(echo("")).unwrap();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["current_time", "echo"]);
    }
}
