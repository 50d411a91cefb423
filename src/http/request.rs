//! Request identity and per-request context.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and echo it on the response
//! - Assemble the explicit context every gated handler runs with
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The backend deadline starts when the context is extracted
//! - Session id comes from the gating middleware, never from a global

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::time::Instant;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::backends::CallOptions;
use crate::currency::CurrencyCode;
use crate::http::server::AppState;
use crate::http::GatewayError;
use crate::session::SessionId;

/// Correlation header set on every request and response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning a UUID request id when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Everything a gated handler needs to talk to the backends.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session_id: SessionId,
    pub currency: CurrencyCode,
    pub request_id: Option<String>,
    /// Shared deadline for every backend call this request makes.
    pub deadline: Instant,
}

impl RequestContext {
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            deadline: self.deadline,
            request_id: self.request_id.clone(),
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = SessionId::from_request_parts(parts, state).await?;
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self {
            session_id,
            currency: CurrencyCode::from_headers(&parts.headers),
            request_id,
            deadline: Instant::now() + state.rpc_budget,
        })
    }
}
