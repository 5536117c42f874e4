//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Seed the filter from configuration, overridable via RUST_LOG

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_level` applies to the gateway's own targets when RUST_LOG is
/// unset. Calling this twice panics, so it runs exactly once from main.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("edge_gateway={0},tower_http={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
