/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC parsing, method dispatch, and the HTTP transport.

pub mod http;
pub mod protocol;
pub mod server;

// Re-export main types
pub use http::{app, ResponseFraming};
pub use server::McpServer;
