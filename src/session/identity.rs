//! Session identity: resolving or minting the visitor's session id.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::http::GatewayError;
use crate::session::cookies::{
    read_cookie, request_cookies, SetCookie, COOKIE_PREFIX, CURRENCY_COOKIE, SESSION_COOKIE,
};

/// Opaque per-visitor identifier. Never inspected, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh random (UUID v4) id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Session id carried by the request, if present and non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        read_cookie(headers, SESSION_COOKIE)
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of inspecting a request for its session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The visitor already had one; pass it through unchanged.
    Existing(SessionId),
    /// A new id was minted and must be set on the response.
    Minted(SessionId),
}

impl Resolution {
    pub fn resolve(headers: &HeaderMap) -> Self {
        match SessionId::from_headers(headers) {
            Some(id) => Resolution::Existing(id),
            None => Resolution::Minted(SessionId::generate()),
        }
    }

    pub fn id(&self) -> &SessionId {
        match self {
            Resolution::Existing(id) | Resolution::Minted(id) => id,
        }
    }
}

/// Middleware guarding every session-gated route.
///
/// The resolved id is stored in the request extensions before the handler
/// runs. A minted id is written to whatever response comes back, error
/// responses included.
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let resolution = Resolution::resolve(request.headers());
    request.extensions_mut().insert(resolution.id().clone());

    let mut response = next.run(request).await;

    if let Resolution::Minted(id) = resolution {
        tracing::debug!(session_id = %id, "Session cookie minted");
        SetCookie::persistent(SESSION_COOKIE, id.as_str()).append_to(response.headers_mut());
    }
    response
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .cloned()
            .ok_or_else(|| GatewayError::Internal("session identity was not resolved".into()))
    }
}

/// Cookies that end a visitor's session: the session and currency cookies,
/// plus any other gateway-owned cookie the request carried.
pub fn logout_cookies(headers: &HeaderMap) -> Vec<SetCookie> {
    let mut names = vec![SESSION_COOKIE.to_string(), CURRENCY_COOKIE.to_string()];
    for (name, _) in request_cookies(headers) {
        if name.starts_with(COOKIE_PREFIX) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names.into_iter().map(SetCookie::expired).collect()
}
