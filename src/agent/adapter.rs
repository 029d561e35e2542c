/// Capability runner adapter
///
/// Bridges a single tool call onto the conversational agent: one call is
/// one "submit message, await final response" round trip under a fresh
/// session id.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::agent::{AgentError, AgentRunner};

/// Adapter that drives one conversational turn per tool call
pub struct RunnerAdapter {
    runner: Arc<dyn AgentRunner>,
    timeout: Duration,
}

impl RunnerAdapter {
    /// Wrap an agent runner with a per-call timeout
    pub fn new(runner: Arc<dyn AgentRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Submit `query` as a single user message and return the agent's
    /// final textual answer.
    ///
    /// Each call runs under a freshly generated session id, so concurrent
    /// calls can never interleave conversational state.
    pub async fn invoke(&self, query: &str) -> Result<String, AgentError> {
        let session_id = Self::new_session_id();
        debug!("Submitting query under session {}", session_id);

        let turn = self.runner.run(query, &session_id);
        match tokio::time::timeout(self.timeout, turn).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => {
                warn!("Agent call failed for session {}: {}", session_id, e);
                Err(e)
            }
            Err(_) => {
                warn!("Agent call timed out for session {}", session_id);
                Err(AgentError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    /// Generate a session id unique over the process lifetime
    fn new_session_id() -> String {
        format!("statplot-sess-{}", Uuid::new_v4())
    }
}
