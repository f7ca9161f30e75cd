//! # Request Handlers
//!
//! Axum request handlers for the cart page, the cart JSON API, and the
//! checkout session endpoint.

use crate::page::{cart_path, render_cart_page};
use crate::state::{AppState, CartSession};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use cart_core::{
    controller, CartError, CartItem, CartResult, CartStore, CartView, CheckoutOutcome,
    CheckoutSessionRequest, CheckoutSessionResponse, Currency, Navigation,
};
use cart_stripe::IDEMPOTENCY_KEY_HEADER;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Add-to-cart request; price and display fields come from the catalog
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Currency switch form
#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    pub currency: String,
}

/// Cart contents as JSON
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub cart_total: i64,
    pub total_items: u32,
    pub currency: Currency,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn unknown_locale(locale: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("Unknown locale: {}", locale), 404)),
    )
}

fn ensure_locale(state: &AppState, locale: &str) -> Result<(), ApiError> {
    if state.config.is_supported_locale(locale) {
        Ok(())
    } else {
        Err(unknown_locale(locale))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-cart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Render the cart page
#[instrument(skip(state))]
pub async fn cart_page(
    State(state): State<AppState>,
    Path((locale, cart_id)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    ensure_locale(&state, &locale)?;
    Ok(Html(render(&state, &locale, &cart_id, None).await))
}

async fn render(state: &AppState, locale: &str, cart_id: &str, notice: Option<&str>) -> String {
    let navigation = load_navigation(state, locale).await;
    let cart = state.carts.snapshot(cart_id).await;
    let view = CartView::build(&cart.store, &cart.settings, locale);
    render_cart_page(&view, &navigation, cart_id, notice)
}

async fn load_navigation(state: &AppState, locale: &str) -> Navigation {
    match state.navigation.load(locale).await {
        Ok(navigation) => navigation,
        Err(e) => {
            warn!("Navigation unavailable for {}: {}", locale, e);
            Navigation::default()
        }
    }
}

/// Apply one store mutation, then send the shopper back to the cart page
async fn mutate_and_return<F>(
    state: &AppState,
    locale: &str,
    cart_id: &str,
    mutation: F,
) -> Result<Redirect, ApiError>
where
    F: FnOnce(&mut CartSession) -> CartResult<()>,
{
    ensure_locale(state, locale)?;
    state
        .carts
        .update(cart_id, mutation)
        .await
        .map_err(cart_error_to_response)?;
    Ok(Redirect::to(&cart_path(locale, cart_id)))
}

/// Quantity + 1
#[instrument(skip(state))]
pub async fn increment_item(
    State(state): State<AppState>,
    Path((locale, cart_id, item_id)): Path<(String, String, String)>,
) -> Result<Redirect, ApiError> {
    mutate_and_return(&state, &locale, &cart_id, |cart| {
        controller::with_current_item(&mut cart.store, &item_id, controller::increment_quantity)
    })
    .await
}

/// Quantity - 1; the store drops the item when it reaches zero
#[instrument(skip(state))]
pub async fn decrement_item(
    State(state): State<AppState>,
    Path((locale, cart_id, item_id)): Path<(String, String, String)>,
) -> Result<Redirect, ApiError> {
    mutate_and_return(&state, &locale, &cart_id, |cart| {
        controller::with_current_item(&mut cart.store, &item_id, controller::decrement_quantity)
    })
    .await
}

/// Remove an item
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((locale, cart_id, item_id)): Path<(String, String, String)>,
) -> Result<Redirect, ApiError> {
    mutate_and_return(&state, &locale, &cart_id, |cart| {
        controller::remove_item(&mut cart.store, &item_id)
    })
    .await
}

/// Remove every item
#[instrument(skip(state))]
pub async fn empty_cart(
    State(state): State<AppState>,
    Path((locale, cart_id)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    mutate_and_return(&state, &locale, &cart_id, |cart| {
        controller::empty_cart(&mut cart.store);
        Ok(())
    })
    .await
}

/// Switch the active currency
#[instrument(skip(state, form), fields(currency = %form.currency))]
pub async fn set_currency(
    State(state): State<AppState>,
    Path((locale, cart_id)): Path<(String, String)>,
    Form(form): Form<CurrencyForm>,
) -> Result<Redirect, ApiError> {
    let currency: Currency = form.currency.parse().map_err(cart_error_to_response)?;
    mutate_and_return(&state, &locale, &cart_id, |cart| {
        cart.settings.active_currency = currency;
        Ok(())
    })
    .await
}

/// Checkout button: request a session, then hand the shopper to the provider.
///
/// Failures re-render the cart page with a notice.
#[instrument(skip(state))]
pub async fn checkout(
    State(state): State<AppState>,
    Path((locale, cart_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    ensure_locale(&state, &locale)?;

    // Snapshot under the lock, then release it before any network I/O
    let cart = state.carts.snapshot(&cart_id).await;
    let request = CheckoutSessionRequest::new(
        cart.store.items(),
        cart.settings.active_currency,
        &locale,
        &state.urls,
    );

    let attempt = state.checkout.checkout(&request).await;
    match attempt.into_outcome() {
        CheckoutOutcome::Redirecting(redirect) => {
            info!(session_id = %redirect.session_id, "Sending shopper to hosted checkout");
            Ok(Redirect::to(&redirect.url).into_response())
        }
        CheckoutOutcome::Failed(err) => {
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            let page = render(&state, &locale, &cart_id, Some(err.user_message())).await;
            Ok((status, Html(page)).into_response())
        }
    }
}

/// Cart contents as JSON
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Json<CartResponse> {
    let cart = state.carts.snapshot(&cart_id).await;
    Json(cart_response(&cart))
}

fn cart_response(cart: &CartSession) -> CartResponse {
    CartResponse {
        items: cart.store.items().to_vec(),
        cart_total: cart.store.cart_total(),
        total_items: cart.store.total_items(),
        currency: cart.settings.active_currency,
    }
}

/// Add a catalog product to a cart
#[instrument(skip(state, request), fields(item_id = %request.id, quantity = request.quantity))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let item = state
        .catalog
        .cart_item(&request.id)
        .map_err(cart_error_to_response)?;

    let response = state
        .carts
        .update(&cart_id, |cart| {
            cart.store.add_item(item, request.quantity)?;
            Ok(cart_response(cart))
        })
        .await
        .map_err(cart_error_to_response)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Caller's idempotency key, or a fresh one
fn idempotency_key(headers: &HeaderMap) -> String {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty() && key.len() <= 255)
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// `POST /api/stripe/create-checkout-session`
///
/// Items are re-priced from the catalog; only their ids and quantities
/// are taken from the request.
#[instrument(skip_all, fields(items = request.items.len(), currency = %request.currency))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let idempotency_key = idempotency_key(&headers);
    debug!(idempotency_key = %idempotency_key, "Checkout session requested");

    let request = state
        .catalog
        .price_request(&request)
        .map_err(cart_error_to_response)?;

    let session = state
        .sessions
        .create_session(&request, &idempotency_key)
        .await
        .map_err(|e| {
            error!(
                provider = state.sessions.provider_name(),
                "Failed to create checkout session: {}", e
            );
            cart_error_to_response(e)
        })?;

    info!("Created checkout session: {}", session.id);
    Ok(Json(CheckoutSessionResponse { session }))
}
