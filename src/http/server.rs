//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the route table
//! - Wire up middleware (request ID, tracing, metrics, timeout, body limit)
//! - Bind server to listener
//! - Stop accepting on the shutdown signal and drain in-flight requests

use axum::{body::Body, http::Request, middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::backends::BackendRegistry;
use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing;

/// Application state injected into handlers.
///
/// Nothing in here changes after startup.
#[derive(Clone)]
pub struct AppState {
    pub backends: Arc<BackendRegistry>,
    /// Budget for all backend calls made by one inbound request.
    pub rpc_budget: Duration,
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// HTTP server for the storefront gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new HTTP server over an already-connected registry.
    pub fn new(config: GatewayConfig, backends: Arc<BackendRegistry>) -> Self {
        let state = AppState {
            backends,
            rpc_budget: Duration::from_secs(config.timeouts.rpc_secs),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Innermost first: body limit, request timeout, metrics, id echo,
    /// trace span, request id.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        routing::build_routes(state, &config.assets.static_dir)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ServiceKind;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    async fn server() -> (GatewayServer, Vec<TcpListener>) {
        let mut config = GatewayConfig::default();
        let mut listeners = Vec::new();
        for kind in ServiceKind::ALL {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            *config.services.slot_mut(kind) = listener.local_addr().unwrap().to_string();
            listeners.push(listener);
        }
        let backends = BackendRegistry::connect(&config.services, Duration::from_secs(1))
            .await
            .unwrap();
        (GatewayServer::new(config, Arc::new(backends)), listeners)
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (server, _listeners) = server().await;
        let response = server
            .router()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_logout_is_not_gated() {
        let (server, _listeners) = server().await;
        let response = server
            .router()
            .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let (server, _listeners) = server().await;
        let body = vec![b'a'; server.config().security.max_body_size + 1];
        let length = body.len().to_string();
        let response = server
            .router()
            .oneshot(
                Request::post("/setCurrency")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header(header::CONTENT_LENGTH, length)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
