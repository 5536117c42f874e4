//! Failure injection tests: timeouts, unreachable instances, and the
//! circuit breaker's open/recover cycle observed end to end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_upstream_timeout_maps_to_504() {
    let backend_addr = common::reserve_port().await;
    common::start_slow_backend(backend_addr, Duration::from_secs(3)).await;

    let registry_addr = common::reserve_port().await;
    let mut services = HashMap::new();
    services.insert("jobs-service".to_string(), vec![backend_addr]);
    common::start_mock_registry(registry_addr, services, Arc::new(AtomicU32::new(0))).await;

    let mut config = common::gateway_config(registry_addr, &[("jobs-service", "/jobs", "")]);
    config.timeouts.upstream_secs = 1;
    let (gateway, shutdown) = common::start_gateway(config).await;

    let response = common::test_client()
        .get(format!("http://{}/jobs/42", gateway))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status_code"], 504);

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_refused_maps_to_503() {
    // Instance address is registered but nothing listens there.
    let backend_addr = common::reserve_port().await;

    let registry_addr = common::reserve_port().await;
    let mut services = HashMap::new();
    services.insert("auth-service".to_string(), vec![backend_addr]);
    common::start_mock_registry(registry_addr, services, Arc::new(AtomicU32::new(0))).await;

    let config = common::gateway_config(registry_addr, &[("auth-service", "/auth", "")]);
    let (gateway, shutdown) = common::start_gateway(config).await;

    let response = common::test_client()
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_opens_after_threshold_without_network_call() {
    // Phase 1: the registered instance refuses every connection.
    let backend_addr = common::reserve_port().await;

    let registry_addr = common::reserve_port().await;
    let mut services = HashMap::new();
    services.insert("jobs-service".to_string(), vec![backend_addr]);
    common::start_mock_registry(registry_addr, services, Arc::new(AtomicU32::new(0))).await;

    let config = common::gateway_config(registry_addr, &[("jobs-service", "/jobs", "")]);
    let (gateway, shutdown) = common::start_gateway(config).await;
    let client = common::test_client();

    // Default threshold is five: five refused calls open the circuit.
    for _ in 0..5 {
        let response = client
            .get(format!("http://{}/jobs/1", gateway))
            .send()
            .await
            .expect("gateway unreachable");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    // Phase 2: a healthy backend appears at the same address. The open
    // breaker must fail fast without ever connecting to it.
    let connections = Arc::new(AtomicU32::new(0));
    common::start_counting_backend(backend_addr, connections.clone()).await;

    let response = client
        .get(format!("http://{}/jobs/1", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(connections.load(Ordering::SeqCst), 0, "open breaker must not dial");

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_recovers_through_probe() {
    let backend_addr = common::reserve_port().await;

    let registry_addr = common::reserve_port().await;
    let mut services = HashMap::new();
    services.insert("auth-service".to_string(), vec![backend_addr]);
    common::start_mock_registry(registry_addr, services, Arc::new(AtomicU32::new(0))).await;

    let mut config = common::gateway_config(registry_addr, &[("auth-service", "/auth", "")]);
    config.circuit_breaker.failure_threshold = 1;
    config.circuit_breaker.recovery_timeout_secs = 1;
    let (gateway, shutdown) = common::start_gateway(config).await;
    let client = common::test_client();

    // One refused call opens the circuit.
    let response = client
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The service comes back, but the cooldown has not elapsed yet.
    common::start_echo_backend(backend_addr).await;
    let response = client
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // After the cooldown the probe goes through, succeeds, and closes the
    // circuit for everyone.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let response = client
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("http://{}/auth/login", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    shutdown.trigger();
}
