//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, RequestContext)
//!     → [routing table picks handler, session gate applied]
//!     → handlers.rs (backend calls through the registry)
//!     → response.rs (errors → status codes, redirects)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, X_REQUEST_ID};
pub use response::GatewayError;
pub use server::{AppState, GatewayServer};
