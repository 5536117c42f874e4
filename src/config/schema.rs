//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to services.
    pub routes: Vec<RouteConfig>,

    /// Service registry (discovery) settings.
    pub registry: RegistryConfig,

    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Bearer token verification settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a logical service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Logical service name to resolve via the registry (e.g., "auth-service").
    pub service: String,

    /// Path prefix to match (literal, case-sensitive).
    pub path_prefix: String,

    /// Prefix prepended to the stripped remainder when forwarding.
    /// Empty means the remainder is forwarded as-is.
    #[serde(default)]
    pub forward_prefix: String,
}

/// Service registry (discovery collaborator) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the discovery service.
    pub url: String,

    /// Timeout for a single registry lookup in seconds.
    pub lookup_timeout_secs: u64,

    /// How long a resolved instance may be served without re-consulting
    /// the registry, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9090".to_string(),
            lookup_timeout_secs: 10,
            cache_ttl_secs: 30,
        }
    }
}

/// Circuit breaker configuration.
///
/// The top-level threshold and timeout apply to every service; individual
/// services may override either value through `overrides`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before a recovery probe is allowed.
    pub recovery_timeout_secs: u64,

    /// Per-service overrides, keyed by service name.
    pub overrides: HashMap<String, BreakerOverride>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_secs: 60,
            overrides: HashMap::new(),
        }
    }
}

/// Partial per-service breaker override.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerOverride {
    pub failure_threshold: Option<u32>,
    pub recovery_timeout_secs: Option<u64>,
}

impl CircuitBreakerConfig {
    /// Effective settings for a service, applying any override.
    pub fn settings_for(&self, service: &str) -> (u32, Duration) {
        let overridden = self.overrides.get(service);
        let threshold = overridden
            .and_then(|o| o.failure_threshold)
            .unwrap_or(self.failure_threshold);
        let recovery = overridden
            .and_then(|o| o.recovery_timeout_secs)
            .unwrap_or(self.recovery_timeout_secs);
        (threshold, Duration::from_secs(recovery))
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for a proxied upstream call in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Bearer token verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable the bearer token pre-check. When disabled, requests pass
    /// through without credential inspection.
    pub enabled: bool,

    /// HS256 shared secret used to verify tokens.
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            jwt_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}
