//! Proxy executor.
//!
//! # Responsibilities
//! - Build the absolute target URL from the resolved instance
//! - Forward method, headers, and body to the instance
//! - Relay the response unmodified; never rewrite body content
//! - Translate transport failures into proxy errors
//!
//! # Design Decisions
//! - Exactly one attempt per call; retrying is not this layer's job
//! - The inbound Host header is dropped so the target sees its own
//!   virtual host; Connection is hop-by-hop and dropped too
//! - Responses stream through without buffering

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::Scheme;
use axum::http::{header, Request, Response, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;
use tokio::time;

use crate::discovery::ServiceInstance;

/// Transport-level failures of a single proxied call.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream did not answer within the deadline.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// The instance was unreachable or refused the connection.
    #[error("upstream connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("upstream transport error: {0}")]
    Transport(String),
}

/// Performs the outbound HTTP call to a resolved instance.
pub struct ProxyExecutor {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl ProxyExecutor {
    pub fn new(client: Client<HttpConnector, Body>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Forward `request` to `instance` at `forward_path`, preserving the
    /// query string, and relay the response.
    pub async fn forward(
        &self,
        instance: &ServiceInstance,
        forward_path: &str,
        request: Request<Body>,
    ) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let uri = target_uri(instance, forward_path, parts.uri.query())
            .map_err(ProxyError::Transport)?;

        let mut builder = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .version(parts.version);

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in parts.headers.iter() {
                if name == header::HOST || name == header::CONNECTION {
                    continue;
                }
                headers.insert(name.clone(), value.clone());
            }
        }

        let outbound = builder
            .body(body)
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        match time::timeout(self.timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) if e.is_connect() => Err(ProxyError::Connect(e.to_string())),
            Ok(Err(e)) => Err(ProxyError::Transport(e.to_string())),
            Err(_) => Err(ProxyError::Timeout(self.timeout)),
        }
    }
}

/// Absolute target URI for an instance, keeping any query string.
fn target_uri(
    instance: &ServiceInstance,
    forward_path: &str,
    query: Option<&str>,
) -> Result<Uri, String> {
    let path_and_query = match query {
        Some(q) => format!("{}?{}", forward_path, q),
        None => forward_path.to_string(),
    };

    Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(instance.authority())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| e.to_string())
}
