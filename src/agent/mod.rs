/// Agent runner integration
///
/// The plotting work itself happens in an external conversational agent.
/// This module defines the trait boundary for that agent and the adapter
/// that turns one tool call into one conversational round trip.

pub mod adapter;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the agent runner boundary
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("agent backend failed: {0}")]
    Failure(String),

    #[error("agent backend did not answer within {0} seconds")]
    Timeout(u64),
}

/// One user message submitted to the agent runner
#[derive(Debug, Serialize)]
pub struct AgentRequest {
    /// The user message text
    pub messages: String,
    /// Conversation session this message belongs to
    pub session_id: String,
}

/// Final response produced by the agent for one conversational turn
#[derive(Debug, Deserialize)]
pub struct AgentResponse {
    /// The agent's textual answer
    pub content: String,
}

/// A long-lived conversational agent runner
///
/// Implementations are expected to be safe for concurrent use; callers
/// isolate conversations from each other via distinct session ids.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Submit one user message under the given session and await the
    /// agent's final textual response.
    async fn run(&self, messages: &str, session_id: &str) -> Result<AgentResponse, AgentError>;
}

// Re-export the main types
pub use adapter::RunnerAdapter;
pub use http::HttpAgentRunner;
