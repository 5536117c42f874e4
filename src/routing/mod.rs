//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (prefix scan)
//!     → Return: RouteMatch { service, forward_path } or no match
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (literal prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (config order is match order)

pub mod table;

pub use table::{RouteMatch, RouteTable};
