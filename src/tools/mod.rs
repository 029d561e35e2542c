/// MCP tools exposed by the plot server
///
/// This module holds the tool registry (name -> descriptor + invocation
/// trampoline) and the concrete tool implementations. The registry is
/// built once at startup and read-only afterwards.

pub mod draw;

pub use draw::DrawTool;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::agent::AgentError;
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Errors that can occur when resolving or invoking a tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Capability(#[from] AgentError),
}

/// Wire types a tool parameter may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Number,
    Boolean,
}

impl ParameterType {
    /// JSON Schema type name for this parameter type
    pub fn json_name(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Number => value.is_number(),
            ParameterType::Boolean => value.is_boolean(),
        }
    }
}

/// One named, typed, optionally-required tool parameter
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub param_type: ParameterType,
    pub required: bool,
}

/// Immutable description of a registered tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    /// Render the flat parameter set as a JSON Schema object
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.param_type.json_name(),
                    "description": param.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Convert to the wire representation used by tools/list
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Check the given arguments against the declared schema
    pub fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), ToolError> {
        for param in &self.parameters {
            match arguments.get(param.name) {
                Some(value) => {
                    if !param.param_type.accepts(value) {
                        return Err(ToolError::InvalidArguments(format!(
                            "parameter '{}' must be a {}",
                            param.name,
                            param.param_type.json_name()
                        )));
                    }
                }
                None if param.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// A callable capability exposed over MCP
#[async_trait]
pub trait Tool: Send + Sync {
    /// The advertised descriptor for this tool
    fn descriptor(&self) -> &ToolDescriptor;

    /// Execute the tool with already-validated arguments
    async fn call(&self, arguments: &HashMap<String, Value>) -> Result<ToolCallResult, ToolError>;
}

/// Registry mapping tool names to capabilities
///
/// Registration happens at startup only; afterwards the table is read-only
/// and safe to share across concurrent requests without locking.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool; order of registration is the order tools/list reports
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!("Registered tool '{}'", tool.descriptor().name);
        self.tools.push(tool);
    }

    /// List all registered tool definitions, in registration order
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.descriptor().definition()).collect()
    }

    /// Validate arguments and invoke the named tool
    pub async fn invoke(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<ToolCallResult, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.descriptor().name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.descriptor().validate(arguments)?;
        tool.call(arguments).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
