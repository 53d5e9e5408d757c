//! JumbleChat server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve the chat on the default port
//! jumblechat-server
//!
//! # Custom bind address and verbose logging
//! jumblechat-server --bind 127.0.0.1:3000 --log-level debug
//! ```
//!
//! The same endpoint serves the HTML client (`GET /`) and the websocket.

use clap::Parser;
use jumblechat_server::{RelayConfig, Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// JumbleChat relay server
#[derive(Parser, Debug)]
#[command(name = "jumblechat-server")]
#[command(about = "Multi-room chat relay with per-room word jumbling")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "10000")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("JumbleChat server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        relay: RelayConfig { max_connections: args.max_connections },
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
