//! Response helpers and request-scoped error mapping.
//!
//! # Responsibilities
//! - Map request failures to HTTP status codes
//! - Build redirect responses for form actions
//!
//! # Design Decisions
//! - Backend timeouts result in 504 Gateway Timeout
//! - Other backend failures result in 502 Bad Gateway
//! - Error bodies are small JSON objects; rendering is not our concern

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::backends::{MoneyError, RpcError};

/// Failures contained to a single request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Bad form data or a currency outside the whitelist.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[source] RpcError),

    #[error("backend timeout: {0}")]
    BackendTimeout(#[source] RpcError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::BackendTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidInput(_) => "invalid_input",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::BackendUnavailable(_) => "backend_unavailable",
            GatewayError::BackendTimeout(_) => "backend_timeout",
            GatewayError::Internal(_) => "internal",
        }
    }
}

impl From<RpcError> for GatewayError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Timeout { .. } => GatewayError::BackendTimeout(err),
            RpcError::NotFound { .. } => GatewayError::NotFound(err.to_string()),
            _ => GatewayError::BackendUnavailable(err),
        }
    }
}

impl From<MoneyError> for GatewayError {
    fn from(err: MoneyError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `302 Found` pointing at `location`.
pub fn found(location: &str) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or(HeaderValue::from_static("/"));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ServiceKind;

    #[test]
    fn test_rpc_error_mapping() {
        let timeout: GatewayError = RpcError::Timeout {
            service: ServiceKind::Cart,
            method: "GetCart",
        }
        .into();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let missing: GatewayError = RpcError::NotFound {
            service: ServiceKind::ProductCatalog,
            method: "GetProduct",
        }
        .into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let down: GatewayError = RpcError::Unavailable {
            service: ServiceKind::Shipping,
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_input_is_client_error() {
        let response = GatewayError::InvalidInput("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("/cart");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/cart");
    }
}
