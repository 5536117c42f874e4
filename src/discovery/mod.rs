//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! resolve(service)
//!     → cache.rs (fresh entry? serve without network)
//!     → registry.rs (GET /services/{name} on miss or expiry)
//!     → first instance stored with timestamp, returned
//!
//! Failure path:
//!     registry empty / unreachable
//!     → ServiceUnavailable propagated
//!     → nothing cached (next request retries discovery)
//! ```
//!
//! # Design Decisions
//! - Registry is a constructor-injected trait so callers test with fakes
//! - Cache entries are immutable value replacements; concurrent misses may
//!   race and last writer wins
//! - No negative caching

pub mod cache;
pub mod registry;

pub use cache::{InstanceCache, ResolveError};
pub use registry::{HttpRegistry, RegistryError, ServiceInstance, ServiceRegistry};
