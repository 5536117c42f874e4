//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown:
//!     Ctrl+C / trigger() → broadcast → stop accepting → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
