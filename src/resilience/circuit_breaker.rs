//! Circuit breaker for failing-service protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: service assumed down, requests fail fast
//! - Half-Open: testing if the service recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Half-Open: next admission after recovery timeout
//! Half-Open → Closed: probe request succeeds
//! Half-Open → Open: probe request fails
//! ```
//!
//! # Design Decisions
//! - Per-service circuit breaker (not global)
//! - Fail fast in Open state (no waiting for timeout)
//! - Single probe in Half-Open (prevents hammering a recovering service)

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Breaker state for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Failure-counting state machine guarding calls to one service.
///
/// The state is small and every transition is a handful of instructions, so
/// a plain mutex is held only for the duration of the bookkeeping, never
/// across a network call.
#[derive(Debug)]
pub struct CircuitBreaker {
    service: String,
    failure_threshold: u32,
    recovery_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(service: &str, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            service: service.to_string(),
            failure_threshold,
            recovery_timeout,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Decide whether a call to this service may be attempted.
    ///
    /// While Open, the failure count is never mutated; once the recovery
    /// timeout has elapsed the breaker moves to Half-Open and admits exactly
    /// one probe until its outcome is recorded.
    pub fn admit(&self) -> Admission {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => Admission::Allowed,
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure_at
                    .map(|at| at.elapsed() >= self.recovery_timeout)
                    .unwrap_or(true);
                if cooled_down {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    tracing::info!(service = %self.service, "Circuit half-open, admitting probe");
                    metrics::record_breaker_state(&self.service, CircuitState::HalfOpen);
                    Admission::Allowed
                } else {
                    Admission::Rejected
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Admission::Rejected
                } else {
                    inner.probe_in_flight = true;
                    Admission::Allowed
                }
            }
        }
    }

    /// Feed the outcome of an admitted call back into the state machine.
    ///
    /// Must not be called for calls rejected at admission; they never
    /// reached the network.
    pub fn record_outcome(&self, success: bool) {
        let mut inner = self.inner.lock().unwrap();
        match (inner.state, success) {
            (CircuitState::Closed, true) => {
                inner.failure_count = 0;
            }
            (CircuitState::Closed, false) => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.last_failure_at = Some(Instant::now());
                    tracing::warn!(
                        service = %self.service,
                        failures = inner.failure_count,
                        "Circuit opened"
                    );
                    metrics::record_breaker_state(&self.service, CircuitState::Open);
                }
            }
            (CircuitState::HalfOpen, true) => {
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
                inner.probe_in_flight = false;
                tracing::info!(service = %self.service, "Circuit closed after successful probe");
                metrics::record_breaker_state(&self.service, CircuitState::Closed);
            }
            (CircuitState::HalfOpen, false) => {
                inner.state = CircuitState::Open;
                inner.failure_count += 1;
                inner.last_failure_at = Some(Instant::now());
                inner.probe_in_flight = false;
                tracing::warn!(service = %self.service, "Probe failed, circuit re-opened");
                metrics::record_breaker_state(&self.service, CircuitState::Open);
            }
            // A straggler outcome from a call admitted before the circuit
            // opened; the breaker is already protecting the service.
            (CircuitState::Open, _) => {}
        }
    }

    /// Current state, for observability and tests.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap().state
    }

    /// Current consecutive failure count.
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().unwrap().failure_count
    }
}

/// Lazily-populated collection of per-service breakers.
pub struct BreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Breaker for `service`, created on first use with the configured
    /// (possibly overridden) settings.
    pub fn get(&self, service: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(service.to_string())
            .or_insert_with(|| {
                let (threshold, recovery) = self.config.settings_for(service);
                Arc::new(CircuitBreaker::new(service, threshold, recovery))
            })
            .clone()
    }

    pub fn admit(&self, service: &str) -> Admission {
        self.get(service).admit()
    }

    pub fn record_outcome(&self, service: &str, success: bool) {
        self.get(service).record_outcome(success);
    }
}
