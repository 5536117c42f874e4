//! Edge gateway library.
//!
//! Accepts inbound HTTP requests, routes them to the owning backend
//! service, resolves a live instance through a time-boxed discovery cache,
//! and forwards the call behind a per-service circuit breaker.

pub mod auth;
pub mod config;
pub mod discovery;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
