//! Edge gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                  EDGE GATEWAY                   │
//!                      │                                                 │
//!   Client Request     │  ┌─────────┐   ┌─────────┐   ┌──────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│ routing │──▶│  resilience  │  │
//!                      │  │ server  │   │  table  │   │   breaker    │  │
//!                      │  └─────────┘   └─────────┘   └──────┬───────┘  │
//!                      │                                      │          │
//!                      │                                      ▼          │
//!                      │                              ┌──────────────┐   │
//!                      │                              │  discovery   │◀──┼── Registry
//!                      │                              │ cache+client │   │   Service
//!                      │                              └──────┬───────┘   │
//!                      │                                      │          │
//!   Client Response    │  ┌─────────┐                 ┌──────▼───────┐   │
//!   ◀──────────────────┼──│ error / │◀────────────────│    proxy     │◀──┼── Backend
//!                      │  │  relay  │                 │   executor   │   │   Service
//!                      │  └─────────┘                 └──────────────┘   │
//!                      │                                                 │
//!                      │  config · auth · observability · lifecycle      │
//!                      └────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use tokio::net::TcpListener;

use edge_gateway::config::loader::load_config;
use edge_gateway::config::GatewayConfig;
use edge_gateway::http::GatewayServer;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path as first argument; defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        registry = %config.registry.url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = GatewayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
