//! JWT verification.
//!
//! # Responsibilities
//! - Decode and verify HS256 bearer tokens against the shared secret
//! - Distinguish expired tokens from otherwise invalid ones
//!
//! # Design Decisions
//! - Verify-only: the gateway never issues tokens
//! - Expiry is enforced; no other claims are interpreted here

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded token payload forwarded as request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier).
    #[serde(default)]
    pub sub: String,

    /// Expiration time (seconds since epoch).
    pub exp: i64,

    /// Issued-at time (seconds since epoch).
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Token verification failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

/// Capability to verify an opaque bearer string into a claim set.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 verifier over a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    tracing::warn!("Token has expired");
                    Err(AuthError::Expired)
                }
                _ => {
                    tracing::warn!(error = %e, "Invalid token");
                    Err(AuthError::Invalid)
                }
            },
        }
    }
}
