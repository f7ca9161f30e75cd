//! # Routes
//!
//! Axum router configuration for the storefront cart.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Cart page (HTML, form posts answer 303 back to the page):
///   - GET  /{locale}/cart/{cart_id}
///   - POST /{locale}/cart/{cart_id}/items/{item_id}/increment
///   - POST /{locale}/cart/{cart_id}/items/{item_id}/decrement
///   - POST /{locale}/cart/{cart_id}/items/{item_id}/remove
///   - POST /{locale}/cart/{cart_id}/empty
///   - POST /{locale}/cart/{cart_id}/currency
///   - POST /{locale}/cart/{cart_id}/checkout
///
/// - JSON API:
///   - GET  /api/carts/{cart_id}
///   - POST /api/carts/{cart_id}/items
///   - POST /api/stripe/create-checkout-session
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::cart_page))
        .route("/items/{item_id}/increment", post(handlers::increment_item))
        .route("/items/{item_id}/decrement", post(handlers::decrement_item))
        .route("/items/{item_id}/remove", post(handlers::remove_item))
        .route("/empty", post(handlers::empty_cart))
        .route("/currency", post(handlers::set_currency))
        .route("/checkout", post(handlers::checkout));

    // CORS only for the JSON API; the page itself is same-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/carts/{cart_id}", get(handlers::get_cart))
        .route("/carts/{cart_id}/items", post(handlers::add_item))
        .route(
            "/stripe/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .layer(cors);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/{locale}/cart/{cart_id}", page_routes)
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
