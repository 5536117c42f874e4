//! Bearer token pre-check subsystem.
//!
//! # Design Decisions
//! - Verification is a pure function behind a trait; the pipeline is tested
//!   with fakes and no hidden global state exists
//! - A present-but-invalid credential rejects the request; an absent
//!   credential passes through (authorization is the downstream's job)

pub mod verifier;

pub use verifier::{AuthError, Claims, JwtVerifier, TokenVerifier};
