/// HTTP transport adapter
///
/// Bridges the hosting HTTP runtime to the protocol engine: POST to the
/// root path carries a JSON-RPC envelope, everything else is a 404. The
/// adapter also owns the process lifecycle (bind on startup, graceful
/// release on shutdown).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use futures::stream;
use tokio::signal;
use tracing::{error, info};

use crate::mcp::protocol::JsonRpcResponse;
use crate::mcp::server::McpServer;
use crate::ServerError;

/// How a single JSON-RPC response is framed on the wire
///
/// Chosen once at startup, never per-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFraming {
    /// One buffered application/json body
    Json,
    /// One framed message on a text/event-stream body
    EventStream,
}

/// Shared per-process state for the HTTP handlers
pub struct AppState {
    engine: McpServer,
    framing: ResponseFraming,
}

/// Build the router: POST / for JSON-RPC, 404 with an empty body elsewhere
pub fn app(engine: McpServer, framing: ResponseFraming) -> Router {
    let state = Arc::new(AppState { engine, framing });

    Router::new()
        .route("/", post(rpc_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Bind and serve until the process is asked to shut down
pub async fn run(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            ServerError::Io(e)
        })?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Handle one JSON-RPC POST
async fn rpc_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.engine.process_body(&body).await {
        // Malformed body: transport-level 4xx, no envelope possible.
        Err(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        // Notification: acknowledged with an empty body.
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Ok(Some(response)) => frame_response(response, state.framing),
    }
}

/// Frame a response envelope per the startup-time configuration
fn frame_response(response: JsonRpcResponse, framing: ResponseFraming) -> Response {
    match framing {
        ResponseFraming::Json => Json(response).into_response(),
        ResponseFraming::EventStream => {
            let payload = match serde_json::to_string(&response) {
                Ok(p) => p,
                Err(e) => {
                    error!("Failed to serialize response envelope: {}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            let stream = stream::once(async move {
                Ok::<_, Infallible>(Event::default().event("message").data(payload))
            });
            Sse::new(stream).into_response()
        }
    }
}

/// Any non-HTTP-RPC request kind gets a 404 with an empty body
async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Resolve when the hosting environment signals shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
