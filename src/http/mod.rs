//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request pipeline)
//!     → routing layer picks the owning service
//!     → resilience layer admits or rejects the call
//!     → discovery layer resolves an instance
//!     → proxy.rs forwards and relays the response
//!     → error.rs maps failures to JSON error responses
//! ```

pub mod error;
pub mod proxy;
pub mod server;

pub use error::GatewayError;
pub use proxy::{ProxyError, ProxyExecutor};
pub use server::GatewayServer;
