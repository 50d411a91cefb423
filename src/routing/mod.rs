//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → /static/*          → ServeDir (no session gate)
//!     → table.rs entry     → [ensure_session] → handler
//!     → known path, wrong method → 405
//!     → no match           → 404
//!
//! Route Compilation (at startup):
//!     route_table()
//!     → merge entries per path
//!     → freeze as immutable axum Router
//! ```
//!
//! # Design Decisions
//! - Routes defined once in code, immutable at runtime
//! - Deterministic: exactly one handler per (method, path)
//! - Explicit NotFound rather than silent default

pub mod table;

pub use table::{build_routes, route_table, Access, RouteEntry, STATIC_PREFIX};
