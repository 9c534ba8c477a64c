// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! MCP tool registry with JSON schema validation.

use crate::mcp::protocol::{JsonRpcId, Tool};
use async_trait::async_trait;
use dashmap::DashMap;
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use squadsquares_client::BackendError;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Tool execution context.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub request_id: Option<JsonRpcId>,
}

/// Tool execution result, rendered for the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, ToolError> {
        serde_json::to_string_pretty(value)
            .map(Self::text)
            .map_err(|e| ToolError::Render(e.to_string()))
    }
}

/// Trait for MCP tools.
#[async_trait]
pub trait McpTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> &Value;

    /// Runs after the arguments passed schema validation.
    async fn execute(&self, params: Value, context: &ToolContext) -> Result<ToolResult, ToolError>;
}

/// Decode validated arguments into a typed parameter struct.
pub fn parse_params<P: DeserializeOwned>(params: Value) -> Result<P, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Registry for MCP tools.
pub struct ToolRegistry {
    tools: DashMap<String, Arc<dyn McpTool>>,
    validators: DashMap<String, JSONSchema>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
            validators: DashMap::new(),
        }
    }

    pub fn register(&self, tool: Arc<dyn McpTool>) -> Result<(), RegistrationError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistrationError::DuplicateName(name));
        }

        let schema = tool.input_schema().clone();
        let validator = JSONSchema::options()
            .compile(&schema)
            .map_err(|e| RegistrationError::Schema(e.to_string()))?;
        self.validators.insert(name.clone(), validator);
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool descriptors, sorted by name.
    pub fn list(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self
            .tools
            .iter()
            .map(|entry| {
                let tool = entry.value();
                Tool {
                    name: tool.name().to_string(),
                    description: Some(tool.description().to_string()),
                    input_schema: tool.input_schema().clone(),
                }
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub async fn execute(
        &self,
        name: &str,
        params: Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let rejection = {
            let validator = self
                .validators
                .get(name)
                .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

            let rejection: Option<String> = validator.validate(&params).err().map(|errors| {
                errors
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            });
            rejection
        };
        if let Some(message) = rejection {
            return Err(ToolError::InvalidParams(message));
        }

        debug!(tool = name, request_id = ?context.request_id, "executing tool");
        tool.execute(params, context).await
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("Invalid tool params: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Failed to render result: {0}")]
    Render(String),
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),
    #[error("Invalid schema: {0}")]
    Schema(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        schema: Value,
        calls: AtomicUsize,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                schema: json!({
                    "type": "object",
                    "properties": { "word": { "type": "string" } },
                    "required": ["word"]
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl McpTool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo a word"
        }

        fn input_schema(&self) -> &Value {
            &self.schema
        }

        async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResult::text(params["word"].as_str().unwrap_or_default()))
        }
    }

    #[tokio::test]
    async fn test_invalid_params_never_reach_the_tool() {
        let registry = ToolRegistry::new();
        let echo = Arc::new(Echo::new());
        registry.register(echo.clone()).unwrap();

        let err = registry
            .execute("echo", json!({"word": 7}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));

        let err = registry
            .execute("echo", json!({}), &ToolContext::default())
            .await
            .unwrap_err();
        match err {
            ToolError::InvalidParams(message) => assert!(message.contains("word"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);

        let ok = registry
            .execute("echo", json!({"word": "hi"}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(ok.text, "hi");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("nope", json!({}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn test_duplicate_and_invalid_schema_rejected() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Echo::new())).unwrap();
        assert!(matches!(
            registry.register(Arc::new(Echo::new())),
            Err(RegistrationError::DuplicateName(_))
        ));

        struct BadSchema(Value);
        #[async_trait]
        impl McpTool for BadSchema {
            fn name(&self) -> &str {
                "bad"
            }
            fn description(&self) -> &str {
                ""
            }
            fn input_schema(&self) -> &Value {
                &self.0
            }
            async fn execute(&self, _: Value, _: &ToolContext) -> Result<ToolResult, ToolError> {
                Ok(ToolResult::text(""))
            }
        }

        let bad = BadSchema(json!({"type": "no-such-type"}));
        assert!(matches!(
            registry.register(Arc::new(bad)),
            Err(RegistrationError::Schema(_))
        ));
        assert_eq!(registry.len(), 1);
    }
}
