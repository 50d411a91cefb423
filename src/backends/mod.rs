//! Backend services subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ServiceAddrs (one address per ServiceKind)
//!     → registry.rs (bounded dial, fatal on failure)
//!     → BackendRegistry (immutable, Arc-shared)
//!
//! Per request:
//!     handler
//!     → clients.rs (typed call, e.g. catalog().get_product)
//!     → rpc.rs (JSON over HTTP, deadline from the inbound request)
//!     → backend service
//! ```

pub mod clients;
pub mod kind;
pub mod money;
pub mod registry;
pub mod rpc;
pub mod types;

pub use kind::ServiceKind;
pub use money::MoneyError;
pub use registry::{BackendEndpoint, BackendRegistry, RegistryError};
pub use rpc::{CallOptions, RpcChannel, RpcError};
pub use types::Money;
