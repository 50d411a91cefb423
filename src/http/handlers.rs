//! Page and action handlers.
//!
//! Pages are rendered as JSON view models. Actions (add to cart, empty cart,
//! change currency, logout) answer with `302 Found`.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, HeaderMap, Uri},
    response::{IntoResponse, Response},
    Form, Json,
};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::backends::clients::CurrencyClient;
use crate::backends::types::{Address, CartItem, CreditCardInfo, OrderResult, PlaceOrderRequest, Product};
use crate::backends::{CallOptions, Money};
use crate::currency::{self, CurrencyCode};
use crate::http::request::RequestContext;
use crate::http::response::found;
use crate::http::server::AppState;
use crate::http::GatewayError;
use crate::session::{logout_cookies, SessionId};

/// Upper bound on a single add-to-cart quantity.
pub const MAX_QUANTITY: u32 = 10;

/// How many recommended products a page shows.
const RECOMMENDATION_LIMIT: usize = 4;

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// Unit price in the visitor's currency.
    pub price: Money,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub session_id: SessionId,
    pub user_currency: CurrencyCode,
    pub currencies: Vec<CurrencyCode>,
    pub products: Vec<ProductView>,
    pub cart_size: i32,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub session_id: SessionId,
    pub user_currency: CurrencyCode,
    pub currencies: Vec<CurrencyCode>,
    pub product: ProductView,
    pub recommendations: Vec<Product>,
    pub cart_size: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
    /// Line total in the visitor's currency.
    pub price: Money,
}

#[derive(Debug, Serialize)]
pub struct CartPage {
    pub session_id: SessionId,
    pub user_currency: CurrencyCode,
    pub currencies: Vec<CurrencyCode>,
    pub recommendations: Vec<Product>,
    pub cart_size: i32,
    pub items: Vec<CartLine>,
    pub shipping_cost: Money,
    pub total_cost: Money,
}

#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub session_id: SessionId,
    pub user_currency: CurrencyCode,
    pub order: OrderResult,
    pub total_paid: Money,
    pub recommendations: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetCurrencyForm {
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub email: String,
    pub street_address: String,
    pub zip_code: i32,
    pub city: String,
    pub state: String,
    pub country: String,
    pub credit_card_number: String,
    pub credit_card_expiration_month: i32,
    pub credit_card_expiration_year: i32,
    pub credit_card_cvv: i32,
}

impl CheckoutForm {
    fn validate(&self) -> Result<(), GatewayError> {
        let required = [
            ("email", &self.email),
            ("street_address", &self.street_address),
            ("city", &self.city),
            ("country", &self.country),
            ("credit_card_number", &self.credit_card_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(GatewayError::InvalidInput(format!("{} is required", field)));
            }
        }
        if !self.email.contains('@') {
            return Err(GatewayError::InvalidInput("email is malformed".into()));
        }
        if !(1..=12).contains(&self.credit_card_expiration_month) {
            return Err(GatewayError::InvalidInput(
                "credit_card_expiration_month must be 1-12".into(),
            ));
        }
        Ok(())
    }
}

fn form_input<T>(form: Result<Form<T>, FormRejection>) -> Result<T, GatewayError> {
    form.map(|Form(inner)| inner)
        .map_err(|rejection| GatewayError::InvalidInput(rejection.body_text()))
}

fn cart_size(items: &[CartItem]) -> i32 {
    items.iter().map(|item| item.quantity).sum()
}

async fn product_view(
    converter: &CurrencyClient<'_>,
    product: Product,
    to: CurrencyCode,
    options: &CallOptions,
) -> Result<ProductView, GatewayError> {
    let price = converter.convert(&product.price_usd, to.as_str(), options).await?;
    Ok(ProductView { product, price })
}

/// Products related to `product_ids`, excluding those ids themselves.
async fn recommended_products(
    state: &AppState,
    ctx: &RequestContext,
    product_ids: &[String],
) -> Result<Vec<Product>, GatewayError> {
    let options = ctx.call_options();
    let ids = state
        .backends
        .recommendations()
        .list_recommendations(ctx.session_id.as_str(), product_ids, &options)
        .await?;

    let catalog = state.backends.catalog();
    let lookups = ids
        .iter()
        .filter(|id| !product_ids.contains(*id))
        .take(RECOMMENDATION_LIMIT)
        .map(|id| catalog.get_product(id, &options));
    Ok(try_join_all(lookups).await?)
}

/// `GET /`
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<HomePage>, GatewayError> {
    let options = ctx.call_options();
    let backends = &state.backends;
    let converter = backends.currency();
    let catalog = backends.catalog();
    let carts = backends.cart();

    let (supported, products, cart) = tokio::try_join!(
        converter.supported_currencies(&options),
        catalog.list_products(&options),
        carts.get_cart(ctx.session_id.as_str(), &options),
    )?;

    let products = try_join_all(
        products
            .into_iter()
            .map(|p| product_view(&converter, p, ctx.currency, &options)),
    )
    .await?;

    tracing::debug!(
        session_id = %ctx.session_id,
        currency = %ctx.currency,
        products = products.len(),
        "Home rendered"
    );

    Ok(Json(HomePage {
        session_id: ctx.session_id,
        user_currency: ctx.currency,
        currencies: currency::displayable(&supported),
        products,
        cart_size: cart_size(&cart),
    }))
}

/// `GET /product/{id}`
pub async fn product(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<ProductPage>, GatewayError> {
    let options = ctx.call_options();
    let backends = &state.backends;
    let converter = backends.currency();
    let ids = [id.clone()];

    let (product, supported, cart, recommendations) = tokio::try_join!(
        async { Ok::<_, GatewayError>(backends.catalog().get_product(&id, &options).await?) },
        async { Ok::<_, GatewayError>(converter.supported_currencies(&options).await?) },
        async { Ok::<_, GatewayError>(backends.cart().get_cart(ctx.session_id.as_str(), &options).await?) },
        recommended_products(&state, &ctx, &ids),
    )?;

    let product = product_view(&converter, product, ctx.currency, &options).await?;

    Ok(Json(ProductPage {
        session_id: ctx.session_id,
        user_currency: ctx.currency,
        currencies: currency::displayable(&supported),
        product,
        recommendations,
        cart_size: cart_size(&cart),
    }))
}

/// `GET /cart`
pub async fn view_cart(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<CartPage>, GatewayError> {
    let options = ctx.call_options();
    let backends = &state.backends;
    let converter = backends.currency();

    let items = backends.cart().get_cart(ctx.session_id.as_str(), &options).await?;
    let product_ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();

    let (supported, recommendations, shipping_usd) = tokio::try_join!(
        async { Ok::<_, GatewayError>(converter.supported_currencies(&options).await?) },
        recommended_products(&state, &ctx, &product_ids),
        async {
            Ok::<_, GatewayError>(backends
                .shipping()
                .get_quote(&Address::default(), &items, &options)
                .await?)
        },
    )?;

    let shipping_cost = converter.convert(&shipping_usd, ctx.currency.as_str(), &options).await?;

    let catalog = &backends.catalog();
    let (converter, options, to) = (&converter, &options, ctx.currency);
    let lines = try_join_all(items.iter().map(|item| async move {
        let product = catalog.get_product(&item.product_id, options).await?;
        let quantity = u32::try_from(item.quantity).map_err(|_| {
            GatewayError::Internal(format!("negative quantity for {}", item.product_id))
        })?;
        let unit = converter.convert(&product.price_usd, to.as_str(), options).await?;
        Ok::<_, GatewayError>(CartLine {
            price: unit.times(quantity)?,
            product,
            quantity: item.quantity,
        })
    }))
    .await?;

    let mut total_cost = shipping_cost.clone();
    for line in &lines {
        total_cost = total_cost.checked_add(&line.price)?;
    }

    Ok(Json(CartPage {
        session_id: ctx.session_id,
        user_currency: ctx.currency,
        currencies: currency::displayable(&supported),
        recommendations,
        cart_size: cart_size(&items),
        items: lines,
        shipping_cost,
        total_cost,
    }))
}

/// `POST /cart`
pub async fn add_to_cart(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<AddToCartForm>, FormRejection>,
) -> Result<Response, GatewayError> {
    let form = form_input(form)?;
    let product_id = form.product_id.trim();
    if product_id.is_empty() {
        return Err(GatewayError::InvalidInput("product_id is required".into()));
    }
    if !(1..=MAX_QUANTITY).contains(&form.quantity) {
        return Err(GatewayError::InvalidInput(format!(
            "quantity must be between 1 and {}",
            MAX_QUANTITY
        )));
    }

    let options = ctx.call_options();
    let product = state.backends.catalog().get_product(product_id, &options).await?;
    state
        .backends
        .cart()
        .add_item(ctx.session_id.as_str(), &product.id, form.quantity as i32, &options)
        .await?;

    tracing::info!(
        session_id = %ctx.session_id,
        product_id = %product.id,
        quantity = form.quantity,
        "Added to cart"
    );
    Ok(found("/cart"))
}

/// `POST /cart/empty`
pub async fn empty_cart(State(state): State<AppState>, ctx: RequestContext) -> Result<Response, GatewayError> {
    state
        .backends
        .cart()
        .empty_cart(ctx.session_id.as_str(), &ctx.call_options())
        .await?;

    tracing::info!(session_id = %ctx.session_id, "Cart emptied");
    Ok(found("/"))
}

/// `POST /setCurrency`
///
/// Redirects back to the referring page. An unknown code fails without
/// touching the currency cookie.
pub async fn set_currency(
    headers: HeaderMap,
    form: Result<Form<SetCurrencyForm>, FormRejection>,
) -> Result<Response, GatewayError> {
    let form = form_input(form)?;
    let (code, cookie) = currency::select(form.currency.trim())?;

    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/");
    let mut response = found(back);
    cookie.append_to(response.headers_mut());

    tracing::debug!(currency = %code, "Currency changed");
    Ok(response)
}

/// `GET /logout`
///
/// Not gated: a visitor without a session is the expected state afterwards.
pub async fn logout(headers: HeaderMap) -> Response {
    let mut response = found("/");
    for cookie in logout_cookies(&headers) {
        cookie.append_to(response.headers_mut());
    }
    tracing::debug!("Session cookies expired");
    response
}

/// `POST /cart/checkout`
pub async fn place_order(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<CheckoutForm>, FormRejection>,
) -> Result<Json<OrderPage>, GatewayError> {
    let form = form_input(form)?;
    form.validate()?;

    let request = PlaceOrderRequest {
        user_id: ctx.session_id.to_string(),
        user_currency: ctx.currency.to_string(),
        email: form.email,
        address: Address {
            street_address: form.street_address,
            city: form.city,
            state: form.state,
            country: form.country,
            zip_code: form.zip_code,
        },
        credit_card: CreditCardInfo {
            credit_card_number: form.credit_card_number,
            credit_card_cvv: form.credit_card_cvv,
            credit_card_expiration_year: form.credit_card_expiration_year,
            credit_card_expiration_month: form.credit_card_expiration_month,
        },
    };

    let options = ctx.call_options();
    let order = state.backends.checkout().place_order(&request, &options).await?;

    tracing::info!(
        session_id = %ctx.session_id,
        order_id = %order.order_id,
        "Order placed"
    );

    let mut total_paid = order.shipping_cost.clone();
    for item in &order.items {
        let quantity = u32::try_from(item.item.quantity).map_err(|_| {
            GatewayError::Internal(format!("negative quantity for {}", item.item.product_id))
        })?;
        total_paid = total_paid.checked_add(&item.cost.times(quantity)?)?;
    }

    let recommendations = recommended_products(&state, &ctx, &[]).await?;

    Ok(Json(OrderPage {
        session_id: ctx.session_id,
        user_currency: ctx.currency,
        order,
        total_paid,
        recommendations,
    }))
}

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    GatewayError::NotFound(format!("no route for {}", uri.path()))
}
