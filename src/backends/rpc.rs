//! JSON-over-HTTP RPC channel to a single backend service.
//!
//! # Wire Contract
//! ```text
//! POST http://{addr}/{ServiceName}/{Method}
//!   content-type: application/json
//!   x-request-id: <inbound request id>
//!   x-deadline-ms: <remaining budget>
//!   body: JSON request
//! ← 2xx JSON response | 404 not found | other status + text body
//! ```
//!
//! # Design Decisions
//! - One keep-alive client per service, cloned cheaply into callers
//! - Every call is bounded by the caller's deadline (`timeout_at`)
//! - Dropping the call future cancels the in-flight request
//! - No retries here; reconnects are left to the connection pool

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::{timeout_at, Instant};

use crate::backends::ServiceKind;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

/// Header carrying the remaining call budget in milliseconds.
pub const X_DEADLINE_MS: &str = "x-deadline-ms";

const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Errors from a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: ServiceKind, reason: String },

    #[error("{service}.{method} deadline exceeded")]
    Timeout {
        service: ServiceKind,
        method: &'static str,
    },

    #[error("{service}.{method} not found")]
    NotFound {
        service: ServiceKind,
        method: &'static str,
    },

    #[error("{service}.{method} returned {status}: {message}")]
    Status {
        service: ServiceKind,
        method: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service}.{method} request could not be encoded: {reason}")]
    Encode {
        service: ServiceKind,
        method: &'static str,
        reason: String,
    },

    #[error("{service}.{method} returned a malformed payload: {reason}")]
    Decode {
        service: ServiceKind,
        method: &'static str,
        reason: String,
    },
}

impl RpcError {
    fn outcome(&self) -> &'static str {
        match self {
            RpcError::Unavailable { .. } => "unavailable",
            RpcError::Timeout { .. } => "timeout",
            RpcError::NotFound { .. } => "not_found",
            RpcError::Status { .. } => "status",
            RpcError::Encode { .. } | RpcError::Decode { .. } => "codec",
        }
    }
}

/// Per-call options derived from the inbound request.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Absolute point after which the call is abandoned.
    pub deadline: Instant,
    /// Correlation id forwarded to the backend.
    pub request_id: Option<String>,
}

/// Reusable handle for issuing calls to one backend service.
#[derive(Debug, Clone)]
pub struct RpcChannel {
    kind: ServiceKind,
    authority: String,
    client: Client<HttpConnector, Body>,
}

impl RpcChannel {
    /// Build a channel for `addr` (`host:port`).
    pub fn new(kind: ServiceKind, addr: &str, connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_keepalive(Some(Duration::from_secs(30)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);

        Self {
            kind,
            authority: addr.to_string(),
            client,
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Issue `method` with a JSON body and decode the JSON reply.
    pub async fn call<Req, Resp>(
        &self,
        method: &'static str,
        request: &Req,
        options: &CallOptions,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let start = std::time::Instant::now();

        let result = match timeout_at(options.deadline, self.exchange(method, request, options)).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout {
                service: self.kind,
                method,
            }),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::record_rpc(self.kind.label(), method, outcome, start);

        if let Err(e) = &result {
            tracing::warn!(
                service = %self.kind,
                method,
                request_id = options.request_id.as_deref().unwrap_or("-"),
                error = %e,
                "Backend call failed"
            );
        }
        result
    }

    async fn exchange<Req, Resp>(
        &self,
        method: &'static str,
        request: &Req,
        options: &CallOptions,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let encode_err = |reason: String| RpcError::Encode {
            service: self.kind,
            method,
            reason,
        };

        let payload = serde_json::to_vec(request).map_err(|e| encode_err(e.to_string()))?;
        let remaining = options.deadline.saturating_duration_since(Instant::now());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("http://{}/{}/{}", self.authority, self.kind.rpc_name(), method))
            .header(header::CONTENT_TYPE, "application/json")
            .header(X_DEADLINE_MS, remaining.as_millis().to_string());
        if let Some(id) = &options.request_id {
            builder = builder.header(X_REQUEST_ID, id.as_str());
        }
        let req = builder
            .body(Body::from(payload))
            .map_err(|e| encode_err(e.to_string()))?;

        let unavailable = |reason: String| RpcError::Unavailable {
            service: self.kind,
            reason,
        };

        let response: hyper::Response<hyper::body::Incoming> = self
            .client
            .request(req)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(RpcError::NotFound {
                service: self.kind,
                method,
            });
        }
        if !status.is_success() {
            return Err(RpcError::Status {
                service: self.kind,
                method,
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RpcError::Decode {
            service: self.kind,
            method,
            reason: e.to_string(),
        })
    }
}
