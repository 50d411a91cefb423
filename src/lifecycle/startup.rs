//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Dial every backend service
//! - Bind the listener and hand back a ready-to-run gateway
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Backends are dialed in order, not concurrently
//! - The listener is bound last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::backends::{BackendRegistry, RegistryError};
use crate::config::{self, ConfigError, GatewayConfig};
use crate::http::GatewayServer;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("backend: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load the configuration from an optional file and an env-style lookup.
pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = config::load_config(path, lookup)?;
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        static_dir = %config.assets.static_dir,
        rpc_timeout_secs = config.timeouts.rpc_secs,
        "Configuration loaded"
    );
    Ok(config)
}

/// A gateway with its backends dialed and its listener bound.
pub struct Gateway {
    server: GatewayServer,
    listener: TcpListener,
}

impl Gateway {
    /// Dial the backends, then bind. Nothing is bound if a dial fails.
    pub async fn start(config: GatewayConfig) -> Result<Self, StartupError> {
        let dial_timeout = Duration::from_secs(config.timeouts.dial_secs);
        let backends = BackendRegistry::connect(&config.services, dial_timeout).await?;
        tracing::info!(services = backends.endpoints().count(), "Backend registry ready");

        let addr = config.listener.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| StartupError::Bind { addr, source })?;

        let server = GatewayServer::new(config, Arc::new(backends));
        Ok(Self { server, listener })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, StartupError> {
        self.listener.local_addr().map_err(StartupError::Serve)
    }

    /// Serve until `shutdown` fires.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        self.server
            .run(self.listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ServiceKind;

    #[test]
    fn test_load_fails_on_missing_address() {
        let err = load(None, |key| {
            ServiceKind::ALL
                .iter()
                .any(|kind| kind.env_key() == key && *kind != ServiceKind::Shipping)
                .then(|| "localhost:1".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
        assert!(err.to_string().contains("SHIPPING_SERVICE_ADDR"));
    }

    #[tokio::test]
    async fn test_start_fails_before_bind_on_unreachable_backend() {
        // Grab a free port, then release it so nothing is listening there.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead = probe.local_addr().unwrap().to_string();
        drop(probe);

        let mut config = GatewayConfig::default();
        for kind in ServiceKind::ALL {
            *config.services.slot_mut(kind) = dead.clone();
        }
        config.timeouts.dial_secs = 1;

        let err = Gateway::start(config).await.err().unwrap();
        assert!(matches!(err, StartupError::Registry(_)));
    }
}
