//! Time-boxed instance cache.
//!
//! # Responsibilities
//! - Serve the last-resolved instance per service while it is fresh
//! - Consult the registry on miss or expiry, one lookup per miss
//! - Never cache a failed or empty resolution
//!
//! # Design Decisions
//! - Per-service entries in a concurrent map; one service's traffic never
//!   blocks another's
//! - Entries are replaced wholesale, never partially updated
//! - Concurrent misses for the same service may each hit the registry;
//!   last writer wins

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

use crate::discovery::registry::{RegistryError, ServiceInstance, ServiceRegistry};
use crate::observability::metrics;

/// Resolution failure: the service has no usable instance right now.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("registry knows no instance of '{0}'")]
    NoInstances(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    instance: ServiceInstance,
    resolved_at: Instant,
}

/// Memoizes the last-resolved instance per service name for a bounded TTL.
pub struct InstanceCache {
    registry: Arc<dyn ServiceRegistry>,
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl InstanceCache {
    pub fn new(registry: Arc<dyn ServiceRegistry>, ttl: Duration) -> Self {
        Self {
            registry,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Resolve an instance for `service`, consulting the registry only when
    /// no fresh entry exists.
    pub async fn resolve(&self, service: &str) -> Result<ServiceInstance, ResolveError> {
        if let Some(entry) = self.entries.get(service) {
            if entry.resolved_at.elapsed() < self.ttl {
                metrics::record_cache_hit(service);
                return Ok(entry.instance.clone());
            }
        }
        metrics::record_cache_miss(service);

        let instances = self.registry.lookup(service).await?;
        let Some(instance) = instances.into_iter().next() else {
            return Err(ResolveError::NoInstances(service.to_string()));
        };

        tracing::debug!(
            service = %service,
            host = %instance.host,
            port = instance.port,
            "Resolved service instance"
        );

        self.entries.insert(
            service.to_string(),
            CacheEntry {
                instance: instance.clone(),
                resolved_at: Instant::now(),
            },
        );

        Ok(instance)
    }
}
