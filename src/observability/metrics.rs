//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (RPS, latency, breaker state, cache traffic)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): latency by service
//! - `gateway_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `gateway_cache_hits_total` / `gateway_cache_misses_total` (counters)
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Unmatched routes record under service "none"

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and spawn its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, service: &str, started_at: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "service" => service.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "gateway_request_duration_seconds",
        "service" => service.to_string()
    )
    .record(started_at.elapsed().as_secs_f64());
}

/// Record a breaker state transition.
pub fn record_breaker_state(service: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    metrics::gauge!(
        "gateway_breaker_state",
        "service" => service.to_string()
    )
    .set(value);
}

/// Record an instance cache hit.
pub fn record_cache_hit(service: &str) {
    metrics::counter!(
        "gateway_cache_hits_total",
        "service" => service.to_string()
    )
    .increment(1);
}

/// Record an instance cache miss (a registry lookup follows).
pub fn record_cache_miss(service: &str) {
    metrics::counter!(
        "gateway_cache_misses_total",
        "service" => service.to_string()
    )
    .increment(1);
}
