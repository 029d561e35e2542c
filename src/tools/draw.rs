/// The draw tool
///
/// Forwards a free-text statistics question to the plotter agent, which
/// searches the web for numbers and answers with a plot script.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::agent::RunnerAdapter;
use crate::mcp::protocol::ToolCallResult;
use crate::tools::{ParameterSpec, ParameterType, Tool, ToolDescriptor, ToolError};

/// Tool that answers statistics questions with plots
pub struct DrawTool {
    descriptor: ToolDescriptor,
    adapter: RunnerAdapter,
}

impl DrawTool {
    /// Create the draw tool backed by the given runner adapter
    pub fn new(adapter: RunnerAdapter) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "draw",
                description: "A tool for querying and drawing data",
                parameters: vec![ParameterSpec {
                    name: "query",
                    description: "Ask anything that could be answered by a plot based on \
                                  objective statistics. For example: the price of apple \
                                  stock in 2025.",
                    param_type: ParameterType::String,
                    required: true,
                }],
            },
            adapter,
        }
    }
}

#[async_trait]
impl Tool for DrawTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: &HashMap<String, Value>) -> Result<ToolCallResult, ToolError> {
        // Presence and type are guaranteed by registry validation.
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing required parameter 'query'".into()))?;

        info!("draw: {}", query);

        let answer = self.adapter.invoke(query).await?;
        Ok(ToolCallResult::text(answer))
    }
}
