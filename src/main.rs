//! Recipe Gateway
//!
//! Front door for the recipe application's backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                RECIPE GATEWAY                │
//!                          │                                              │
//!   POST /api/recipe/      │  ┌────────────┐   ┌─────────────────────┐    │
//!        generate ─────────┼─▶│ credential │──▶│ generation proxy    │────┼──▶ Backend
//!                          │  │   check    │   │ (300 s wait bound)  │    │    /recipe/generate
//!                          │  └────────────┘   └─────────────────────┘    │
//!                          │                                              │
//!   ANY /api/* ────────────┼─────────────────▶ pass-through ──────────────┼──▶ Backend /*
//!                          │                                              │
//!                          │  config (TOML + watcher) · tracing · metrics  │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use recipe_gateway::config::{load_config, ConfigWatcher, GatewayConfig};
use recipe_gateway::observability::{logging, metrics};
use recipe_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "recipe-gateway")]
#[command(about = "Gateway in front of the recipe backend", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "RECIPE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "recipe-gateway starting"
    );

    if args.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        generation_timeout_ms = config.generation.timeout_ms,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // The watcher must outlive the server; dropping it stops reloads.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().trigger_on_signal());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
