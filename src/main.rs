/// Main entry point for the statplot MCP server
///
/// This file sets up logging, parses command line arguments, and starts
/// the server. The server answers JSON-RPC requests over a single HTTP
/// POST endpoint following the MCP streamable-HTTP protocol.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use statplot_mcp::{ResponseFraming, ServerConfig, StatPlotServer};

/// Command line arguments for the statplot MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind the HTTP listener to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the HTTP listener to
    #[arg(long, default_value_t = 30123)]
    port: u16,

    /// Endpoint of the plotter agent backend
    #[arg(long, default_value = "http://localhost:8000/run")]
    agent_url: String,

    /// Per-call agent timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Frame responses as text/event-stream instead of buffered JSON
    #[arg(long)]
    sse: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("statplot_mcp={}", log_level))
        .init();

    info!("Starting statplot MCP server");

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let config = ServerConfig {
        addr,
        agent_url: args.agent_url,
        timeout: Duration::from_secs(args.timeout_secs),
        framing: if args.sse {
            ResponseFraming::EventStream
        } else {
            ResponseFraming::Json
        },
    };

    info!("Agent backend at: {}", config.agent_url);

    // Bind failure or a broken listener is fatal; the error propagates out
    // of main and the process exits non-zero.
    let server = StatPlotServer::new(config);
    server.run().await?;

    info!("statplot MCP server shutdown complete");
    Ok(())
}
