//! Shared utilities for integration testing.
//!
//! One mock process answers for all six backend services on a random port,
//! speaking the same JSON-over-HTTP contract the gateway's RPC channel uses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use storefront_gateway::backends::ServiceKind;
use storefront_gateway::config::GatewayConfig;
use storefront_gateway::{Gateway, Shutdown};
use tokio::net::TcpListener;

/// State shared by every mock service.
#[derive(Clone, Default)]
pub struct MockBackends {
    carts: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    /// When set, the cart service answers every call with 500.
    pub cart_broken: Arc<AtomicBool>,
    /// Delay before the cart service answers `GetCart`, in milliseconds.
    cart_delay_ms: Arc<AtomicU64>,
    /// When set, placed orders report a negative item quantity.
    corrupt_orders: Arc<AtomicBool>,
}

impl MockBackends {
    pub fn cart_items(&self, user_id: &str) -> Vec<Value> {
        self.carts
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn break_cart(&self) {
        self.cart_broken.store(true, Ordering::SeqCst);
    }

    pub fn corrupt_orders(&self) {
        self.corrupt_orders.store(true, Ordering::SeqCst);
    }

    pub fn stall_cart(&self, delay: Duration) {
        self.cart_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

fn usd(units: i64, nanos: i32) -> Value {
    json!({ "currency_code": "USD", "units": units, "nanos": nanos })
}

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": "OLJCESPC7Z",
            "name": "Sunglasses",
            "description": "Add a modern touch to your outfits.",
            "picture": "/static/img/products/sunglasses.jpg",
            "price_usd": usd(19, 990_000_000),
            "categories": ["accessories"]
        }),
        json!({
            "id": "66VCHSJNUP",
            "name": "Tank Top",
            "description": "Perfectly cropped cotton tank.",
            "picture": "/static/img/products/tank-top.jpg",
            "price_usd": usd(18, 990_000_000),
            "categories": ["clothing"]
        }),
    ]
}

async fn list_products() -> Json<Value> {
    Json(json!({ "products": catalog() }))
}

async fn get_product(Json(req): Json<Value>) -> Result<Json<Value>, StatusCode> {
    catalog()
        .into_iter()
        .find(|p| p["id"] == req["id"])
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn supported_currencies() -> Json<Value> {
    Json(json!({ "currency_codes": ["EUR", "USD", "JPY", "GBP", "CAD"] }))
}

/// Relabels the amount; the rate is always 1.
async fn convert(Json(req): Json<Value>) -> Json<Value> {
    let mut money = req["from"].clone();
    money["currency_code"] = req["to_code"].clone();
    Json(money)
}

async fn get_cart(
    State(mock): State<MockBackends>,
    Json(req): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if mock.cart_broken.load(Ordering::SeqCst) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "cart store down".into()));
    }
    let delay = mock.cart_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let user_id = req["user_id"].as_str().unwrap_or_default().to_string();
    let items = mock.cart_items(&user_id);
    Ok(Json(json!({ "user_id": user_id, "items": items })))
}

async fn add_item(
    State(mock): State<MockBackends>,
    Json(req): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if mock.cart_broken.load(Ordering::SeqCst) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "cart store down".into()));
    }
    let user_id = req["user_id"].as_str().unwrap_or_default().to_string();
    mock.carts
        .lock()
        .unwrap()
        .entry(user_id)
        .or_default()
        .push(req["item"].clone());
    Ok(Json(json!({})))
}

async fn empty_cart(State(mock): State<MockBackends>, Json(req): Json<Value>) -> Json<Value> {
    let user_id = req["user_id"].as_str().unwrap_or_default();
    mock.carts.lock().unwrap().remove(user_id);
    Json(json!({}))
}

async fn list_recommendations() -> Json<Value> {
    Json(json!({ "product_ids": ["OLJCESPC7Z", "66VCHSJNUP"] }))
}

async fn get_quote() -> Json<Value> {
    Json(json!({ "cost_usd": usd(8, 990_000_000) }))
}

async fn place_order(State(mock): State<MockBackends>, Json(req): Json<Value>) -> Json<Value> {
    let quantity = if mock.corrupt_orders.load(Ordering::SeqCst) { -2 } else { 2 };
    Json(json!({
        "order": {
            "order_id": "order-1",
            "shipping_tracking_id": "track-1",
            "shipping_cost": usd(8, 990_000_000),
            "shipping_address": req["address"].clone(),
            "items": [
                { "item": { "product_id": "OLJCESPC7Z", "quantity": quantity }, "cost": usd(19, 990_000_000) }
            ]
        }
    }))
}

/// Start the mock services. Returns the address all six share.
pub async fn start_mock_backends(mock: MockBackends) -> SocketAddr {
    let app = Router::new()
        .route("/ProductCatalogService/ListProducts", post(list_products))
        .route("/ProductCatalogService/GetProduct", post(get_product))
        .route("/CurrencyService/GetSupportedCurrencies", post(supported_currencies))
        .route("/CurrencyService/Convert", post(convert))
        .route("/CartService/GetCart", post(get_cart))
        .route("/CartService/AddItem", post(add_item))
        .route("/CartService/EmptyCart", post(empty_cart))
        .route("/RecommendationService/ListRecommendations", post(list_recommendations))
        .route("/ShippingService/GetQuote", post(get_quote))
        .route("/CheckoutService/PlaceOrder", post(place_order))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Gateway config pointing every service at `backend` and binding a random port.
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.listen_addr = "127.0.0.1".into();
    config.listener.port = 0;
    for kind in ServiceKind::ALL {
        *config.services.slot_mut(kind) = backend.to_string();
    }
    config.timeouts.dial_secs = 1;
    config.timeouts.rpc_secs = 2;
    config.assets.static_dir = std::env::temp_dir().to_string_lossy().into_owned();
    config
}

/// A running gateway in front of fresh mock backends.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub mock: MockBackends,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(tweak: impl FnOnce(&mut GatewayConfig)) -> Self {
        let mock = MockBackends::default();
        let backend = start_mock_backends(mock.clone()).await;

        let mut config = gateway_config(backend);
        tweak(&mut config);

        let gateway = Gateway::start(config).await.expect("gateway failed to start");
        let addr = gateway.local_addr().unwrap();

        let shutdown = Shutdown::new();
        tokio::spawn(gateway.run(shutdown.subscribe()));

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .unwrap();

        Self {
            addr,
            mock,
            client,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Every `Set-Cookie` header on a response.
pub fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `Set-Cookie` header for `name`, if any.
pub fn set_cookie(res: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(res).into_iter().find(|c| c.starts_with(&prefix))
}

/// Value part of a `Set-Cookie` header.
pub fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map(|(_, v)| v).unwrap_or_default()
}
