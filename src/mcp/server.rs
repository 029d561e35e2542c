/// MCP protocol engine
///
/// Dispatches JSON-RPC requests to the right handler:
/// 1. Parses the JSON-RPC envelope from the HTTP body
/// 2. Routes by method (initialize, tools/list, tools/call, ...)
/// 3. Produces zero or one JSON-RPC response envelope
///
/// The engine is stateless: every method is independently dispatchable and
/// nothing persists between requests, so it can serve concurrent requests
/// without locking.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{ToolError, ToolRegistry};

/// Stateless JSON-RPC engine over the tool registry
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a new engine over a fully-registered tool registry
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Process one raw request body
    ///
    /// Returns `Ok(Some(response))` for correlated requests, `Ok(None)` for
    /// notifications, and `Err` with a parse description when the body is
    /// not a JSON-RPC envelope at all (the transport maps that to 4xx).
    pub async fn process_body(&self, body: &str) -> Result<Option<JsonRpcResponse>, String> {
        let request: JsonRpcRequest = serde_json::from_str(body).map_err(|e| {
            warn!("Failed to parse JSON-RPC request: {}", e);
            format!("invalid JSON-RPC request: {}", e)
        })?;

        debug!("Processing request: method={} id={:?}", request.method, request.id);

        let is_notification = request.is_notification();

        if request.jsonrpc != "2.0" {
            // A notification carries no id to correlate an error envelope
            // with; it still gets the empty ack.
            if is_notification {
                warn!("Dropping notification with JSON-RPC version '{}'", request.jsonrpc);
                return Ok(None);
            }
            return Ok(Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                format!("unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            )));
        }

        let response = self.handle_request(request).await;

        // Pure notifications get no envelope; the transport answers with
        // an empty body the client treats as success.
        if is_notification {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Handle a parsed JSON-RPC request
    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "notifications/initialized" | "initialized" => {
                // Nominal lifecycle step only; nothing to record in
                // stateless mode.
                JsonRpcResponse::success(request.id, json!(null))
            }
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if let Some(params) = request.params.clone() {
            if let Ok(params) = serde_json::from_value::<InitializeParams>(params) {
                let client = params
                    .client_info
                    .map(|c| c.name)
                    .unwrap_or_else(|| "unknown".to_string());
                info!(
                    "MCP client connected: {} (protocol {})",
                    client,
                    params.protocol_version.as_deref().unwrap_or("unspecified")
                );
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "statplot-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(
                request.id,
                error_codes::INTERNAL_ERROR,
                e.to_string(),
                None,
            ),
        }
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.registry.list();
        debug!("tools/list: {} tools", tools.len());
        JsonRpcResponse::success(request.id, json!({ "tools": tools }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match request.params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        info!("tools/call: {}", tool_params.name);

        match self
            .registry
            .invoke(&tool_params.name, &tool_params.arguments)
            .await
        {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(request.id, value),
                Err(e) => JsonRpcResponse::error(
                    request.id,
                    error_codes::INTERNAL_ERROR,
                    e.to_string(),
                    None,
                ),
            },
            Err(e) => Self::tool_error_response(request.id, e),
        }
    }

    /// Map a tool invocation failure to a structured JSON-RPC error
    ///
    /// One discipline everywhere: protocol-level problems are error
    /// envelopes, never soft text content.
    fn tool_error_response(id: Option<Value>, error: ToolError) -> JsonRpcResponse {
        use crate::agent::AgentError;

        let code = match &error {
            ToolError::UnknownTool(_) => error_codes::UNKNOWN_TOOL,
            ToolError::InvalidArguments(_) => error_codes::INVALID_PARAMS,
            ToolError::Capability(AgentError::Timeout(_)) => error_codes::CAPABILITY_TIMEOUT,
            ToolError::Capability(AgentError::Failure(_)) => error_codes::CAPABILITY_FAILURE,
        };

        warn!("tools/call failed: {}", error);
        JsonRpcResponse::error(id, code, error.to_string(), None)
    }
}
