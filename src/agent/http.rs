/// HTTP-backed agent runner
///
/// Talks to the external agent service that performs the web search and
/// produces the plot script. The service accepts `{messages, session_id}`
/// and answers with an object exposing a textual `content` field.

use async_trait::async_trait;
use tracing::debug;

use crate::agent::{AgentError, AgentRequest, AgentResponse, AgentRunner};

/// Agent runner that forwards conversational turns to a remote HTTP endpoint
pub struct HttpAgentRunner {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAgentRunner {
    /// Create a runner pointing at the given agent endpoint URL
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl AgentRunner for HttpAgentRunner {
    async fn run(&self, messages: &str, session_id: &str) -> Result<AgentResponse, AgentError> {
        let request = AgentRequest {
            messages: messages.to_string(),
            session_id: session_id.to_string(),
        };

        debug!("POST {} (session {})", self.endpoint, session_id);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Failure(format!(
                "agent endpoint returned HTTP {}",
                status
            )));
        }

        response
            .json::<AgentResponse>()
            .await
            .map_err(|e| AgentError::Failure(format!("invalid agent response: {}", e)))
    }
}
