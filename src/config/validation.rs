//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Detect conflicting routes (duplicate prefixes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("route for service '{0}' has empty service name or prefix")]
    EmptyRoute(String),

    #[error("route prefix '{0}' must start with '/'")]
    PrefixMissingSlash(String),

    #[error("duplicate route prefix '{0}'")]
    DuplicatePrefix(String),

    #[error("invalid registry url '{0}'")]
    InvalidRegistryUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a configuration, accumulating every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen_prefixes = HashSet::new();
    for route in &config.routes {
        if route.service.is_empty() || route.path_prefix.is_empty() {
            errors.push(ValidationError::EmptyRoute(route.service.clone()));
            continue;
        }
        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::PrefixMissingSlash(route.path_prefix.clone()));
        }
        if !seen_prefixes.insert(route.path_prefix.clone()) {
            errors.push(ValidationError::DuplicatePrefix(route.path_prefix.clone()));
        }
    }

    if Url::parse(&config.registry.url).is_err() {
        errors.push(ValidationError::InvalidRegistryUrl(
            config.registry.url.clone(),
        ));
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroValue("circuit_breaker.failure_threshold"));
    }
    if config.circuit_breaker.recovery_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("circuit_breaker.recovery_timeout_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.upstream_secs"));
    }
    if config.registry.lookup_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("registry.lookup_timeout_secs"));
    }
    if config.registry.cache_ttl_secs == 0 {
        errors.push(ValidationError::ZeroValue("registry.cache_ttl_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
