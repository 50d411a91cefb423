//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::backends::ServiceKind;

/// Root configuration for the storefront gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (port, interface).
    pub listener: ListenerConfig,

    /// Network address of every backend service.
    pub services: ServiceAddrs,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static asset passthrough.
    pub assets: AssetConfig,

    /// Request hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Interface address. Empty means all interfaces.
    pub listen_addr: String,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        let host = if self.listen_addr.is_empty() {
            "0.0.0.0"
        } else {
            self.listen_addr.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            listen_addr: String::new(),
        }
    }
}

/// Addresses (`host:port`) of the six backend services.
///
/// Empty strings mean "not configured"; validation rejects them.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceAddrs {
    pub product_catalog: String,
    pub currency: String,
    pub cart: String,
    pub recommendation: String,
    pub checkout: String,
    pub shipping: String,
}

impl ServiceAddrs {
    /// Address configured for `kind`.
    pub fn get(&self, kind: ServiceKind) -> &str {
        match kind {
            ServiceKind::ProductCatalog => &self.product_catalog,
            ServiceKind::Currency => &self.currency,
            ServiceKind::Cart => &self.cart,
            ServiceKind::Recommendation => &self.recommendation,
            ServiceKind::Checkout => &self.checkout,
            ServiceKind::Shipping => &self.shipping,
        }
    }

    /// Mutable slot for `kind`, used by the environment overlay.
    pub fn slot_mut(&mut self, kind: ServiceKind) -> &mut String {
        match kind {
            ServiceKind::ProductCatalog => &mut self.product_catalog,
            ServiceKind::Currency => &mut self.currency,
            ServiceKind::Cart => &mut self.cart,
            ServiceKind::Recommendation => &mut self.recommendation,
            ServiceKind::Checkout => &mut self.checkout,
            ServiceKind::Shipping => &mut self.shipping,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Startup dial timeout per backend in seconds.
    pub dial_secs: u64,

    /// Budget for all backend calls made on behalf of one inbound request.
    pub rpc_secs: u64,

    /// Total time allowed for an inbound request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            dial_secs: 3,
            rpc_secs: 10,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address. `None` disables the exporter.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Local directory served under `/static/`.
    pub static_dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            static_dir: "./static".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}
