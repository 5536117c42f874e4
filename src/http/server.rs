//! HTTP server setup and request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the health route and the proxy fallback
//! - Wire up middleware (tracing, request ID, panic containment)
//! - Compose the per-request pipeline: credential pre-check → route →
//!   breaker admission → instance resolution → forward → outcome recording
//! - Log method/path/service/status/latency for every request
//!
//! # Design Decisions
//! - One shared hyper client for proxying and registry lookups
//! - A rejected admission never reaches the network and is never recorded
//!   as a breaker failure
//! - A relayed response counts as a breaker success whatever its status;
//!   the breaker tracks reachability, not downstream correctness
//! - Client disconnects drop the in-flight call before its outcome is
//!   recorded; cancelled calls are excluded from breaker accounting

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::GatewayConfig;
use crate::discovery::{HttpRegistry, InstanceCache};
use crate::http::error::GatewayError;
use crate::http::proxy::{ProxyError, ProxyExecutor};
use crate::observability::metrics;
use crate::resilience::{Admission, BreakerRegistry};
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub cache: Arc<InstanceCache>,
    pub breakers: Arc<BreakerRegistry>,
    pub proxy: Arc<ProxyExecutor>,
    /// None when the bearer pre-check is disabled.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
}

/// HTTP server for the edge gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Create a new gateway server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client: Client<HttpConnector, Body> =
            Client::builder(TokioExecutor::new()).build(connector);

        let registry = HttpRegistry::new(
            client.clone(),
            &config.registry.url,
            Duration::from_secs(config.registry.lookup_timeout_secs),
        );
        let cache = Arc::new(InstanceCache::new(
            Arc::new(registry),
            Duration::from_secs(config.registry.cache_ttl_secs),
        ));

        let state = AppState {
            table: Arc::new(RouteTable::from_config(&config.routes)),
            cache,
            breakers: Arc::new(BreakerRegistry::new(config.circuit_breaker.clone())),
            proxy: Arc::new(ProxyExecutor::new(
                client,
                Duration::from_secs(config.timeouts.upstream_secs),
            )),
            verifier: config
                .auth
                .enabled
                .then(|| Arc::new(JwtVerifier::new(&config.auth.jwt_secret)) as Arc<dyn TokenVerifier>),
        };

        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Gateway self-health. Always 200, bypasses routing entirely.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "edge-gateway" }))
}

/// Main pipeline handler for all proxied traffic.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let (service, outcome) = run_pipeline(&state, request).await;

    let response = match outcome {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                service = service.as_deref().unwrap_or("none"),
                error = %error,
                "Request failed"
            );
            error.into_response()
        }
    };

    let status = response.status();
    let service_label = service.as_deref().unwrap_or("none");
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        service = %service_label,
        status = status.as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(&method, status.as_u16(), service_label, started);

    response
}

/// The per-request pipeline. Returns the resolved service name (when one
/// was determined) alongside the outcome so the caller can log and record
/// metrics uniformly.
async fn run_pipeline(
    state: &AppState,
    request: Request<Body>,
) -> (Option<String>, Result<Response, GatewayError>) {
    // 1. Credential pre-check: absent passes through, invalid rejects.
    if let Some(verifier) = &state.verifier {
        if let Some(token) = bearer_token(request.headers()) {
            match verifier.verify(token) {
                Ok(claims) => {
                    tracing::debug!(sub = %claims.sub, "Bearer token verified");
                }
                Err(_) => return (None, Err(GatewayError::Unauthorized)),
            }
        }
    }

    // 2. Route. An unmatched path touches nothing else.
    let path = request.uri().path();
    let Some(matched) = state.table.route(path) else {
        return (None, Err(GatewayError::RouteNotFound(path.to_string())));
    };
    let service = matched.service;

    // 3. Breaker admission. Rejected calls never reach the network and
    //    are not recorded.
    if state.breakers.admit(&service) == Admission::Rejected {
        return (
            Some(service.clone()),
            Err(GatewayError::CircuitOpen(service)),
        );
    }

    // 4. Resolve an instance. Failure counts against the breaker.
    let instance = match state.cache.resolve(&service).await {
        Ok(instance) => instance,
        Err(e) => {
            state.breakers.record_outcome(&service, false);
            tracing::warn!(service = %service, error = %e, "Instance resolution failed");
            return (
                Some(service.clone()),
                Err(GatewayError::ServiceUnavailable(service)),
            );
        }
    };

    // 5. Forward exactly once and record the outcome.
    match state
        .proxy
        .forward(&instance, &matched.forward_path, request)
        .await
    {
        Ok(response) => {
            state.breakers.record_outcome(&service, true);
            (Some(service), Ok(response))
        }
        Err(error) => {
            state.breakers.record_outcome(&service, false);
            let mapped = match error {
                ProxyError::Timeout(_) => GatewayError::GatewayTimeout(service.clone()),
                ProxyError::Connect(detail) => {
                    tracing::warn!(service = %service, detail = %detail, "Upstream unreachable");
                    GatewayError::ServiceUnavailable(service.clone())
                }
                ProxyError::Transport(detail) => GatewayError::Internal(detail),
            };
            (Some(service), Err(mapped))
        }
    }
}

/// Extract the bearer token from the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
