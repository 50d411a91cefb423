//! Storefront edge gateway library.
//!
//! Terminates shopper HTTP traffic, resolves a session and display currency
//! per request, and fans out to six backend services over a fixed registry.

pub mod backends;
pub mod config;
pub mod currency;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod session;

pub use backends::BackendRegistry;
pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::{Gateway, Shutdown, StartupError};
