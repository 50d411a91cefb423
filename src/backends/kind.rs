//! The fixed set of backend services the gateway talks to.

use std::fmt;

/// One of the six backend service kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    ProductCatalog,
    Currency,
    Cart,
    Recommendation,
    Checkout,
    Shipping,
}

impl ServiceKind {
    /// Every kind, in startup dial order.
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::ProductCatalog,
        ServiceKind::Currency,
        ServiceKind::Cart,
        ServiceKind::Recommendation,
        ServiceKind::Checkout,
        ServiceKind::Shipping,
    ];

    /// Environment key holding this service's address.
    pub fn env_key(self) -> &'static str {
        match self {
            ServiceKind::ProductCatalog => "PRODUCT_CATALOG_SERVICE_ADDR",
            ServiceKind::Currency => "CURRENCY_SERVICE_ADDR",
            ServiceKind::Cart => "CART_SERVICE_ADDR",
            ServiceKind::Recommendation => "RECOMMENDATION_SERVICE_ADDR",
            ServiceKind::Checkout => "CHECKOUT_SERVICE_ADDR",
            ServiceKind::Shipping => "SHIPPING_SERVICE_ADDR",
        }
    }

    /// Service name used as the first path segment of every RPC.
    pub fn rpc_name(self) -> &'static str {
        match self {
            ServiceKind::ProductCatalog => "ProductCatalogService",
            ServiceKind::Currency => "CurrencyService",
            ServiceKind::Cart => "CartService",
            ServiceKind::Recommendation => "RecommendationService",
            ServiceKind::Checkout => "CheckoutService",
            ServiceKind::Shipping => "ShippingService",
        }
    }

    /// Short label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::ProductCatalog => "catalog",
            ServiceKind::Currency => "currency",
            ServiceKind::Cart => "cart",
            ServiceKind::Recommendation => "recommendation",
            ServiceKind::Checkout => "checkout",
            ServiceKind::Shipping => "shipping",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
