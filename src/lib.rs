/// Public library interface for the statplot MCP server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

// Internal modules
pub mod agent;
pub mod mcp;
pub mod tools;

// Re-export public types
pub use agent::{AgentError, AgentResponse, AgentRunner, HttpAgentRunner, RunnerAdapter};
pub use mcp::{app, McpServer, ResponseFraming};
pub use tools::{DrawTool, ToolError, ToolRegistry};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Startup configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub addr: SocketAddr,
    /// Endpoint of the external plotter agent
    pub agent_url: String,
    /// Per-call capability timeout
    pub timeout: Duration,
    /// Response framing, fixed at startup
    pub framing: ResponseFraming,
}

/// Main statplot server that implements the MCP protocol over HTTP
///
/// Wires the tool registry (a single `draw` tool backed by the external
/// plotter agent) to the stateless JSON-RPC engine and the HTTP transport.
pub struct StatPlotServer {
    config: ServerConfig,
    engine: McpServer,
}

impl StatPlotServer {
    /// Build the server with the default registry: one `draw` tool over
    /// an HTTP-backed agent runner.
    pub fn new(config: ServerConfig) -> Self {
        let runner = Arc::new(HttpAgentRunner::new(config.agent_url.clone()));
        let adapter = RunnerAdapter::new(runner, config.timeout);

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DrawTool::new(adapter)));

        Self {
            engine: McpServer::new(registry),
            config,
        }
    }

    /// Build a server around an already-assembled registry (useful for tests)
    pub fn with_registry(config: ServerConfig, registry: ToolRegistry) -> Self {
        Self {
            engine: McpServer::new(registry),
            config,
        }
    }

    /// Run the HTTP server until shutdown is requested
    ///
    /// This method blocks until the process receives a shutdown signal or
    /// the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server (framing: {:?})", self.config.framing);
        let router = mcp::app(self.engine, self.config.framing);
        mcp::http::run(router, self.config.addr).await
    }
}
