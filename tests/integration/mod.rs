/// Integration tests driving the HTTP transport end to end
use statplot_mcp::*;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use statplot_mcp::agent::{AgentError, AgentResponse, AgentRunner};

/// Runner that answers immediately and records session ids
struct EchoRunner {
    sessions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AgentRunner for EchoRunner {
    async fn run(&self, messages: &str, session_id: &str) -> Result<AgentResponse, AgentError> {
        self.sessions.lock().unwrap().push(session_id.to_string());
        Ok(AgentResponse {
            content: format!("plot for: {}", messages),
        })
    }
}

/// Runner that always fails
struct BrokenRunner;

#[async_trait]
impl AgentRunner for BrokenRunner {
    async fn run(&self, _messages: &str, _session_id: &str) -> Result<AgentResponse, AgentError> {
        Err(AgentError::Failure("backend unavailable".to_string()))
    }
}

fn test_app_with_runner(
    runner: Arc<dyn AgentRunner>,
    framing: ResponseFraming,
) -> Router {
    let adapter = RunnerAdapter::new(runner, Duration::from_secs(5));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DrawTool::new(adapter)));
    app(McpServer::new(registry), framing)
}

fn test_app() -> (Router, Arc<Mutex<Vec<String>>>) {
    let sessions = Arc::new(Mutex::new(Vec::new()));
    let runner = Arc::new(EchoRunner {
        sessions: sessions.clone(),
    });
    (test_app_with_runner(runner, ResponseFraming::Json), sessions)
}

async fn post(app: &Router, payload: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post_rpc(app: &Router, payload: Value) -> (StatusCode, Value) {
    let (status, bytes) = post(app, &payload.to_string()).await;
    let body: Value = serde_json::from_slice(&bytes).expect("response body is JSON");
    (status, body)
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_echoes_id_and_reports_version() {
        let (app, _) = test_app();
        let (status, body) = post_rpc(
            &app,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-06-18",
                    "capabilities": {"experimental": {}},
                    "clientInfo": {"name": "test-client", "version": "0.1.0"},
                },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], "2025-06-18");
        assert_eq!(body["result"]["serverInfo"]["name"], "statplot-mcp");
        assert!(body["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_without_params_still_succeeds() {
        // Stateless mode: every method stands alone.
        let (app, _) = test_app();
        let (status, body) =
            post_rpc(&app, json!({"jsonrpc": "2.0", "id": 7, "method": "initialize"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert!(body["result"]["protocolVersion"].is_string());
    }

    #[tokio::test]
    async fn test_initialized_notification_gets_empty_ack() {
        let (app, _) = test_app();
        let (status, bytes) = post(
            &app,
            &json!({"jsonrpc": "2.0", "method": "notifications/initialized", "params": {}})
                .to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_initialized_with_id_gets_null_result() {
        let (app, _) = test_app();
        let (status, body) = post_rpc(
            &app,
            json!({"jsonrpc": "2.0", "id": 9, "method": "notifications/initialized"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 9);
        assert!(body["result"].is_null());
        assert!(body.get("error").is_none());
    }
}

#[cfg(test)]
mod tools_tests {
    use super::*;

    #[tokio::test]
    async fn test_tools_list_is_exactly_draw() {
        let (app, _) = test_app();
        let (status, body) =
            post_rpc(&app, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 2);

        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "draw");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["query"]));

        // Stable across repeated calls within a process lifetime.
        let (_, again) =
            post_rpc(&app, json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"})).await;
        assert_eq!(body["result"], again["result"]);
    }

    #[tokio::test]
    async fn test_tools_call_draw() {
        let (app, _) = test_app();
        let (status, body) = post_rpc(
            &app,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "draw",
                    "arguments": {"query": "apple stock price 2025"},
                },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3);

        let content = body["result"]["content"].as_array().unwrap();
        assert!(!content.is_empty());
        assert_eq!(content[0]["type"], "text");
        assert!(!content[0]["text"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_structured_error() {
        let (app, _) = test_app();
        let (status, body) = post_rpc(
            &app,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "paint", "arguments": {}},
            }),
        )
        .await;

        // Never a transport failure, never a crash.
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 4);
        assert_eq!(body["error"]["code"], -32001);
        assert!(body["error"]["message"].as_str().unwrap().contains("paint"));
    }

    #[tokio::test]
    async fn test_tools_call_missing_query_is_invalid_params() {
        let (app, _) = test_app();
        let (status, body) = post_rpc(
            &app,
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "draw", "arguments": {}},
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_failing_backend_is_capability_failure() {
        let app = test_app_with_runner(Arc::new(BrokenRunner), ResponseFraming::Json);
        let (status, body) = post_rpc(
            &app,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": {"name": "draw", "arguments": {"query": "anything"}},
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32002);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_get_distinct_sessions() {
        let (app, sessions) = test_app();

        let (first, second) = tokio::join!(
            post_rpc(
                &app,
                json!({
                    "jsonrpc": "2.0",
                    "id": 10,
                    "method": "tools/call",
                    "params": {"name": "draw", "arguments": {"query": "first query"}},
                }),
            ),
            post_rpc(
                &app,
                json!({
                    "jsonrpc": "2.0",
                    "id": 11,
                    "method": "tools/call",
                    "params": {"name": "draw", "arguments": {"query": "second query"}},
                }),
            ),
        );

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(second.0, StatusCode::OK);
        assert_ne!(
            first.1["result"]["content"][0]["text"],
            second.1["result"]["content"][0]["text"]
        );

        let sessions = sessions.lock().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_ne!(sessions[0], sessions[1]);
    }
}

#[cfg(test)]
mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_method_is_method_not_found() {
        let (app, _) = test_app();
        let (status, body) =
            post_rpc(&app, json!({"jsonrpc": "2.0", "id": 8, "method": "bogus"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 8);
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version_is_invalid_request() {
        let (app, _) = test_app();
        let (status, body) =
            post_rpc(&app, json!({"jsonrpc": "1.0", "id": 8, "method": "tools/list"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_wrong_version_notification_gets_empty_ack() {
        // Notifications carry no id to correlate an error envelope with,
        // so even a bad-version one is acknowledged with an empty body.
        let (app, _) = test_app();
        let (status, bytes) = post(
            &app,
            &json!({"jsonrpc": "1.0", "method": "notifications/initialized"}).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_get_on_rpc_path_is_method_not_allowed() {
        let (app, _) = test_app();
        let request = Request::builder()
            .method("GET")
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_malformed_body_is_http_400() {
        let (app, _) = test_app();
        let (status, _) = post(&app, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_with_empty_body() {
        let (app, _) = test_app();
        let request = Request::builder()
            .method("GET")
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_framing() {
        let sessions = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(EchoRunner { sessions });
        let app = test_app_with_runner(runner, ResponseFraming::EventStream);

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json, text/event-stream")
            .body(Body::from(
                json!({"jsonrpc": "2.0", "id": 12, "method": "tools/list"}).to_string(),
            ))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("event: message"));
        assert!(body.contains("\"jsonrpc\":\"2.0\""));
        assert!(body.contains("draw"));
    }
}

#[cfg(test)]
mod server_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_server_construction() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            agent_url: "http://localhost:8000/run".to_string(),
            timeout: Duration::from_secs(5),
            framing: ResponseFraming::Json,
        };

        // Construction wires the default registry; binding happens in run().
        let _server = StatPlotServer::new(config);
    }

    #[tokio::test]
    async fn test_server_with_custom_registry() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            agent_url: "unused".to_string(),
            timeout: Duration::from_secs(5),
            framing: ResponseFraming::Json,
        };

        let mut registry = ToolRegistry::new();
        let adapter = RunnerAdapter::new(Arc::new(BrokenRunner), Duration::from_secs(1));
        registry.register(Arc::new(DrawTool::new(adapter)));

        let _server = StatPlotServer::with_registry(config, registry);
    }
}

#[tokio::test]
async fn test_registry_direct_invocation() {
    let sessions = Arc::new(Mutex::new(Vec::new()));
    let runner = Arc::new(EchoRunner {
        sessions: sessions.clone(),
    });
    let adapter = RunnerAdapter::new(runner, Duration::from_secs(5));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DrawTool::new(adapter)));

    let mut args = HashMap::new();
    args.insert("query".to_string(), json!("median rent berlin 2024"));

    let result = registry.invoke("draw", &args).await.unwrap();
    assert_eq!(result.content[0].content_type, "text");
    assert_eq!(sessions.lock().unwrap().len(), 1);
}
