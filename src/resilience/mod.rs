//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request for service:
//!     → circuit_breaker.rs admit() (fail fast while the service looks down)
//!     → [proxied call happens elsewhere]
//!     → circuit_breaker.rs record_outcome() (feed the state machine)
//! ```
//!
//! # Design Decisions
//! - One breaker per service name, created lazily, never dropped
//! - Admission and outcome recording bracket every proxied call; a
//!   rejected admission is never recorded as a failure
//! - No retry machinery: recovery happens on the breaker's own clock

pub mod circuit_breaker;

pub use circuit_breaker::{Admission, BreakerRegistry, CircuitBreaker, CircuitState};
