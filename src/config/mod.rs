//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (environment overrides: *_SERVICE_ADDR, PORT, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → read once during startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults except the six backend addresses
//! - A missing backend address is a startup failure, never a runtime one

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig,
    ServiceAddrs, TimeoutConfig,
};
pub use validation::ValidationError;
