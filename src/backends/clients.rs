//! Typed clients for each backend service.
//!
//! Each client borrows the registry's channel, so constructing one per
//! request is free.

use crate::backends::rpc::{CallOptions, RpcChannel, RpcError};
use crate::backends::types::*;

pub struct CatalogClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> CatalogClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn list_products(&self, options: &CallOptions) -> Result<Vec<Product>, RpcError> {
        let resp: ListProductsResponse = self.channel.call("ListProducts", &Empty {}, options).await?;
        Ok(resp.products)
    }

    pub async fn get_product(&self, id: &str, options: &CallOptions) -> Result<Product, RpcError> {
        let req = GetProductRequest { id: id.to_string() };
        self.channel.call("GetProduct", &req, options).await
    }
}

pub struct CurrencyClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> CurrencyClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    /// Every currency code the currency service can convert to.
    pub async fn supported_currencies(&self, options: &CallOptions) -> Result<Vec<String>, RpcError> {
        let resp: GetSupportedCurrenciesResponse = self
            .channel
            .call("GetSupportedCurrencies", &Empty {}, options)
            .await?;
        Ok(resp.currency_codes)
    }

    /// Convert `from` into `to_code`. Same-currency conversions skip the call.
    pub async fn convert(&self, from: &Money, to_code: &str, options: &CallOptions) -> Result<Money, RpcError> {
        if from.currency_code == to_code {
            return Ok(from.clone());
        }
        let req = CurrencyConversionRequest {
            from: from.clone(),
            to_code: to_code.to_string(),
        };
        self.channel.call("Convert", &req, options).await
    }
}

pub struct CartClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> CartClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn get_cart(&self, user_id: &str, options: &CallOptions) -> Result<Vec<CartItem>, RpcError> {
        let req = GetCartRequest {
            user_id: user_id.to_string(),
        };
        let cart: Cart = self.channel.call("GetCart", &req, options).await?;
        Ok(cart.items)
    }

    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i32,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        let req = AddItemRequest {
            user_id: user_id.to_string(),
            item: CartItem {
                product_id: product_id.to_string(),
                quantity,
            },
        };
        let _: Empty = self.channel.call("AddItem", &req, options).await?;
        Ok(())
    }

    pub async fn empty_cart(&self, user_id: &str, options: &CallOptions) -> Result<(), RpcError> {
        let req = EmptyCartRequest {
            user_id: user_id.to_string(),
        };
        let _: Empty = self.channel.call("EmptyCart", &req, options).await?;
        Ok(())
    }
}

pub struct RecommendationClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> RecommendationClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    /// Ids of products related to `product_ids`.
    pub async fn list_recommendations(
        &self,
        user_id: &str,
        product_ids: &[String],
        options: &CallOptions,
    ) -> Result<Vec<String>, RpcError> {
        let req = ListRecommendationsRequest {
            user_id: user_id.to_string(),
            product_ids: product_ids.to_vec(),
        };
        let resp: ListRecommendationsResponse = self
            .channel
            .call("ListRecommendations", &req, options)
            .await?;
        Ok(resp.product_ids)
    }
}

pub struct CheckoutClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> CheckoutClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    pub async fn place_order(&self, req: &PlaceOrderRequest, options: &CallOptions) -> Result<OrderResult, RpcError> {
        let resp: PlaceOrderResponse = self.channel.call("PlaceOrder", req, options).await?;
        Ok(resp.order)
    }
}

pub struct ShippingClient<'a> {
    channel: &'a RpcChannel,
}

impl<'a> ShippingClient<'a> {
    pub fn new(channel: &'a RpcChannel) -> Self {
        Self { channel }
    }

    /// Shipping cost in USD for `items` sent to `address`.
    pub async fn get_quote(
        &self,
        address: &Address,
        items: &[CartItem],
        options: &CallOptions,
    ) -> Result<Money, RpcError> {
        let req = GetQuoteRequest {
            address: address.clone(),
            items: items.to_vec(),
        };
        let resp: GetQuoteResponse = self.channel.call("GetQuote", &req, options).await?;
        Ok(resp.cost_usd)
    }
}
