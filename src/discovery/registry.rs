//! Service registry client.
//!
//! # Responsibilities
//! - Query the discovery collaborator for instances of a named service
//! - Translate transport failures into registry errors
//!
//! # Design Decisions
//! - Non-2xx responses mean "no healthy instance known", not an error
//! - Lookups have their own (shorter) timeout, independent of proxy calls

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde::Deserialize;
use thiserror::Error;
use tokio::time;

/// One concrete network endpoint currently serving a service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub service: String,
    pub host: String,
    pub port: u16,
}

impl ServiceInstance {
    /// Authority string ("host:port") for building target URIs.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Errors raised while consulting the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry did not answer within the lookup timeout.
    #[error("registry lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The registry could not be reached.
    #[error("registry unreachable: {0}")]
    Transport(String),

    /// The registry answered with a body we could not decode.
    #[error("registry response malformed: {0}")]
    Decode(String),
}

/// Capability to look up live instances for a logical service name.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Return every known instance of `service`. An empty vector means the
    /// registry has no healthy instance.
    async fn lookup(&self, service: &str) -> Result<Vec<ServiceInstance>, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    instances: Vec<WireInstance>,
}

#[derive(Debug, Deserialize)]
struct WireInstance {
    address: String,
    port: u16,
}

/// HTTP client for the discovery service's `GET /services/{name}` endpoint.
pub struct HttpRegistry {
    client: Client<HttpConnector, Body>,
    base_url: String,
    lookup_timeout: Duration,
}

impl HttpRegistry {
    pub fn new(client: Client<HttpConnector, Body>, base_url: &str, lookup_timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            lookup_timeout,
        }
    }
}

#[async_trait]
impl ServiceRegistry for HttpRegistry {
    async fn lookup(&self, service: &str) -> Result<Vec<ServiceInstance>, RegistryError> {
        let uri = format!("{}/services/{}", self.base_url, service);

        let request = Request::builder()
            .method("GET")
            .uri(&uri)
            .header("user-agent", "edge-gateway-discovery")
            .body(Body::empty())
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let response = match time::timeout(self.lookup_timeout, self.client.request(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(RegistryError::Transport(e.to_string())),
            Err(_) => return Err(RegistryError::Timeout(self.lookup_timeout)),
        };

        if !response.status().is_success() {
            tracing::warn!(
                service = %service,
                status = %response.status(),
                "Registry lookup returned non-success status"
            );
            return Ok(Vec::new());
        }

        let body = axum::body::to_bytes(Body::new(response.into_body()), 1024 * 1024)
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        let decoded: LookupResponse =
            serde_json::from_slice(&body).map_err(|e| RegistryError::Decode(e.to_string()))?;

        Ok(decoded
            .instances
            .into_iter()
            .map(|i| ServiceInstance {
                service: service.to_string(),
                host: i.address,
                port: i.port,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_decodes() {
        let body = r#"{
            "service_name": "auth-service",
            "instances": [
                {"address": "10.0.0.5", "port": 8001, "tags": [], "status": "passing"},
                {"address": "10.0.0.6", "port": 8001}
            ]
        }"#;

        let decoded: LookupResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.instances.len(), 2);
        assert_eq!(decoded.instances[0].address, "10.0.0.5");
        assert_eq!(decoded.instances[0].port, 8001);
    }

    #[test]
    fn test_missing_instances_decodes_empty() {
        let decoded: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.instances.is_empty());
    }

    #[test]
    fn test_instance_authority() {
        let instance = ServiceInstance {
            service: "auth-service".into(),
            host: "127.0.0.1".into(),
            port: 8001,
        };
        assert_eq!(instance.authority(), "127.0.0.1:8001");
    }
}
