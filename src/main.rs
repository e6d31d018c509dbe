//! Wikipedia REST gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ axum router ──▶ handlers ──▶ WikipediaApi ─┼──▶ en.wikipedia.org
//!                           │   (request id,    (coerce      (reqwest,     │    /w/api.php
//!     Client Response       │    trace, cors,    params)      serde)       │
//!     ◀─────────────────────┼── JSON / envelope ◀──────────────────────────┼───
//!                           └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from an optional TOML file (`--config`), overridden by
//! the `PORT` and `WIKI_API_URL` environment variables.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use wiki_gateway::config::load_config;
use wiki_gateway::lifecycle::{signals, Shutdown};
use wiki_gateway::observability::{logging, metrics};
use wiki_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "wiki-gateway")]
#[command(about = "REST gateway for the Wikipedia content API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("wiki-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        api_url = %config.upstream.api_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
