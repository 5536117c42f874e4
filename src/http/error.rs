//! Gateway error taxonomy.
//!
//! # Responsibilities
//! - Name every way a request can fail inside the gateway
//! - Map each failure to an HTTP status and a JSON error body
//!
//! # Design Decisions
//! - No silent local fallback: every failure surfaces through this enum
//! - Internal details are logged, never sent to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures the gateway reports to its callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No configured prefix matches the request path.
    #[error("no route matches path '{0}'")]
    RouteNotFound(String),

    /// A bearer credential was present but did not verify.
    #[error("invalid or expired credential")]
    Unauthorized,

    /// The circuit breaker rejected the call without attempting it.
    #[error("service '{0}' is unavailable")]
    CircuitOpen(String),

    /// No instance is known, or the instance refused the connection.
    #[error("service '{0}' is unavailable")]
    ServiceUnavailable(String),

    /// The upstream call exceeded its deadline.
    #[error("upstream call to '{0}' timed out")]
    GatewayTimeout(String),

    /// Unanticipated failure; detail stays in the logs.
    #[error("internal gateway error")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status this failure maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::CircuitOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status_code": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
