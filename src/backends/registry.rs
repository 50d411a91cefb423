//! Backend connection registry.
//!
//! # Responsibilities
//! - Dial every backend service once at startup, bounded by a timeout
//! - Fail startup on the first unreachable service (no degraded mode)
//! - Hand out typed clients over the persistent channels afterwards
//!
//! # Design Decisions
//! - Immutable after construction; shared via `Arc` without locks
//! - One channel per service kind, never re-dialed by the registry
//! - Mid-life disconnects are absorbed by the channel's connection pool

use std::time::Duration;

use tokio::net::TcpStream;

use crate::backends::clients::{
    CartClient, CatalogClient, CheckoutClient, CurrencyClient, RecommendationClient,
    ShippingClient,
};
use crate::backends::rpc::RpcChannel;
use crate::backends::ServiceKind;
use crate::config::ServiceAddrs;

/// Startup dial failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to connect {service} at {addr}: {source}")]
    Dial {
        service: ServiceKind,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect {service} at {addr}: no connection within {}ms", .timeout.as_millis())]
    DialTimeout {
        service: ServiceKind,
        addr: String,
        timeout: Duration,
    },
}

/// A dialed backend: name, address and the channel used to reach it.
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    pub kind: ServiceKind,
    pub addr: String,
    channel: RpcChannel,
}

impl BackendEndpoint {
    /// Verify `addr` accepts a TCP connection within `timeout`, then build
    /// the channel for it.
    pub async fn dial(kind: ServiceKind, addr: &str, timeout: Duration) -> Result<Self, RegistryError> {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_probe)) => {}
            Ok(Err(source)) => {
                return Err(RegistryError::Dial {
                    service: kind,
                    addr: addr.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(RegistryError::DialTimeout {
                    service: kind,
                    addr: addr.to_string(),
                    timeout,
                })
            }
        }

        tracing::info!(service = %kind, addr = %addr, "Backend connected");

        Ok(Self {
            kind,
            addr: addr.to_string(),
            channel: RpcChannel::new(kind, addr, timeout),
        })
    }

    pub fn channel(&self) -> &RpcChannel {
        &self.channel
    }
}

/// One endpoint per backend service, fixed for the process lifetime.
#[derive(Debug)]
pub struct BackendRegistry {
    product_catalog: BackendEndpoint,
    currency: BackendEndpoint,
    cart: BackendEndpoint,
    recommendation: BackendEndpoint,
    checkout: BackendEndpoint,
    shipping: BackendEndpoint,
}

impl BackendRegistry {
    /// Dial all six services in order. The first failure aborts.
    pub async fn connect(addrs: &ServiceAddrs, dial_timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            product_catalog: Self::dial(addrs, ServiceKind::ProductCatalog, dial_timeout).await?,
            currency: Self::dial(addrs, ServiceKind::Currency, dial_timeout).await?,
            cart: Self::dial(addrs, ServiceKind::Cart, dial_timeout).await?,
            recommendation: Self::dial(addrs, ServiceKind::Recommendation, dial_timeout).await?,
            checkout: Self::dial(addrs, ServiceKind::Checkout, dial_timeout).await?,
            shipping: Self::dial(addrs, ServiceKind::Shipping, dial_timeout).await?,
        })
    }

    async fn dial(
        addrs: &ServiceAddrs,
        kind: ServiceKind,
        timeout: Duration,
    ) -> Result<BackendEndpoint, RegistryError> {
        BackendEndpoint::dial(kind, addrs.get(kind), timeout).await
    }

    pub fn endpoint(&self, kind: ServiceKind) -> &BackendEndpoint {
        match kind {
            ServiceKind::ProductCatalog => &self.product_catalog,
            ServiceKind::Currency => &self.currency,
            ServiceKind::Cart => &self.cart,
            ServiceKind::Recommendation => &self.recommendation,
            ServiceKind::Checkout => &self.checkout,
            ServiceKind::Shipping => &self.shipping,
        }
    }

    /// All endpoints in dial order.
    pub fn endpoints(&self) -> impl Iterator<Item = &BackendEndpoint> {
        ServiceKind::ALL.into_iter().map(move |kind| self.endpoint(kind))
    }

    pub fn catalog(&self) -> CatalogClient<'_> {
        CatalogClient::new(self.product_catalog.channel())
    }

    pub fn currency(&self) -> CurrencyClient<'_> {
        CurrencyClient::new(self.currency.channel())
    }

    pub fn cart(&self) -> CartClient<'_> {
        CartClient::new(self.cart.channel())
    }

    pub fn recommendations(&self) -> RecommendationClient<'_> {
        RecommendationClient::new(self.recommendation.channel())
    }

    pub fn checkout(&self) -> CheckoutClient<'_> {
        CheckoutClient::new(self.checkout.channel())
    }

    pub fn shipping(&self) -> ShippingClient<'_> {
        ShippingClient::new(self.shipping.channel())
    }
}
