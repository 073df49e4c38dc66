//! Product composite service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                  PRODUCT COMPOSITE                    │
//!   Client Request     │  ┌──────────┐    ┌─────────────┐    ┌──────────────┐  │
//!   ───────────────────┼─▶│   http   │───▶│ integration │───▶│ worker pool  │──┼──▶ product
//!                      │  │  server  │    │  dispatch   │    │ slots+queue  │──┼──▶ recommendation
//!                      │  └────┬─────┘    └─────────────┘    └──────────────┘──┼──▶ review
//!                      │       │                                               │
//!   Health Request     │       ▼                                               │
//!   ───────────────────┼─▶┌──────────────┐  concurrent probes, per-probe       │
//!                      │  │    health    │──timeout, no pool──────────────────┼──▶ /actuator/health ×3
//!                      │  │  aggregator  │                                     │
//!                      │  └──────────────┘                                     │
//!                      │                                                       │
//!                      │  config · observability · lifecycle                   │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use product_composite::config::{default_config, load_config};
use product_composite::http::HttpServer;
use product_composite::lifecycle::{self, signals, Shutdown};
use product_composite::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "product-composite")]
#[command(about = "Composite service over the product, recommendation and review services")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "product-composite starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = lifecycle::build(config)?;

    let listener = TcpListener::bind(&app.config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        pool = %app.pool.name(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&app);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            if !shutdown.is_triggered() {
                tracing::warn!("HTTP server stopped before a shutdown signal");
            }
            result??
        }
        _ = signals::wait_for_termination() => {
            shutdown.trigger();
            server_task.await??;
        }
    }

    app.drain().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
