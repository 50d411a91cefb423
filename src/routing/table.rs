//! Static route table and router assembly.
//!
//! # Responsibilities
//! - Declare every (method, path) → handler entry once
//! - Wrap session-gated entries in the session identity middleware
//! - Mount `/static` outside the gate and a NotFound fallback
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Entries sharing a path are merged into one method router, so a
//!   method mismatch on a known path answers 405
//! - Gating wraps the handler, so a minted cookie is set on the response
//!   even when the handler fails
//! - Gating applies to matched handlers only; a 405 mints nothing

use axum::{
    handler::Handler,
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tower_http::services::ServeDir;

use crate::http::handlers;
use crate::http::server::AppState;
use crate::session::ensure_session;

/// Whether a route requires a resolved session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    SessionGated,
    Public,
}

/// One (method, path) → handler binding.
pub struct RouteEntry {
    pub method: MethodFilter,
    pub path: &'static str,
    pub access: Access,
    handler: MethodRouter<AppState>,
}

impl RouteEntry {
    fn new<H, T>(method: MethodFilter, path: &'static str, access: Access, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            method,
            path,
            access,
            handler: on(method, handler),
        }
    }

    fn gated<H, T>(method: MethodFilter, path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(method, path, Access::SessionGated, handler)
    }

    fn public<H, T>(method: MethodFilter, path: &'static str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::new(method, path, Access::Public, handler)
    }

    /// The handler with the session gate applied when required.
    fn into_method_router(self) -> MethodRouter<AppState> {
        match self.access {
            Access::SessionGated => self.handler.route_layer(middleware::from_fn(ensure_session)),
            Access::Public => self.handler,
        }
    }
}

/// Path prefix served straight from disk, outside the session gate.
pub const STATIC_PREFIX: &str = "/static";

/// Every route the gateway serves. GET entries also answer HEAD.
pub fn route_table() -> Vec<RouteEntry> {
    vec![
        RouteEntry::gated(MethodFilter::GET, "/", handlers::home),
        RouteEntry::gated(MethodFilter::GET, "/product/{id}", handlers::product),
        RouteEntry::gated(MethodFilter::GET, "/cart", handlers::view_cart),
        RouteEntry::gated(MethodFilter::POST, "/cart", handlers::add_to_cart),
        RouteEntry::gated(MethodFilter::POST, "/cart/empty", handlers::empty_cart),
        RouteEntry::gated(MethodFilter::POST, "/setCurrency", handlers::set_currency),
        RouteEntry::public(MethodFilter::GET, "/logout", handlers::logout),
        RouteEntry::gated(MethodFilter::POST, "/cart/checkout", handlers::place_order),
    ]
}

/// Assemble the router from [`route_table`].
pub fn build_routes(state: AppState, static_dir: &str) -> Router {
    let mut router = Router::new();
    for entry in route_table() {
        tracing::debug!(
            method = ?entry.method,
            path = entry.path,
            access = ?entry.access,
            "Route registered"
        );
        router = router.route(entry.path, entry.into_method_router());
    }

    router
        .nest_service(STATIC_PREFIX, ServeDir::new(static_dir))
        .fallback(handlers::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_logout_is_public() {
        let public: Vec<_> = route_table()
            .into_iter()
            .filter(|e| e.access == Access::Public)
            .map(|e| e.path)
            .collect();
        assert_eq!(public, vec!["/logout"]);
    }

    #[test]
    fn test_method_path_pairs_unique() {
        let table = route_table();
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                assert!(
                    !(a.path == b.path && a.method == b.method),
                    "duplicate route {:?} {}",
                    a.method,
                    a.path
                );
            }
        }
    }

    #[test]
    fn test_static_not_in_table() {
        assert!(route_table()
            .iter()
            .all(|e| !e.path.starts_with(STATIC_PREFIX)));
    }
}
