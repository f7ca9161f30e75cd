//! # cart-core
//!
//! Core types and traits for the storefront cart page.
//!
//! This crate provides:
//! - `CartStore` trait and `MemoryCartStore` for cart items and totals
//! - `Catalog`, the server-side price list items are resolved against
//! - Quantity controller actions (`increment_quantity`, `decrement_quantity`, ...)
//! - `CartView` render model with amounts formatted by `format_currency_value`
//! - `CheckoutInitiator` for the checkout-button flow
//! - `SessionProvider`, `SessionEndpoint` and `PaymentClientLoader` seams
//! - `NavigationLoader` for page chrome
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CartItem, CartStore, CartView, CheckoutSessionRequest, MemoryCartStore, Settings};
//!
//! let mut store = MemoryCartStore::new();
//! store.add_item(item, 2)?;
//!
//! // Render
//! let view = CartView::build(&store, &settings, "en");
//!
//! // Checkout button
//! let request = CheckoutSessionRequest::new(store.items(), settings.active_currency, "en", &urls);
//! let attempt = initiator.checkout(&request).await;
//! if let Some(redirect) = attempt.redirect() {
//!     // send the shopper to redirect.url
//! }
//! ```

pub mod catalog;
pub mod checkout;
pub mod controller;
pub mod currency;
pub mod error;
pub mod item;
pub mod navigation;
pub mod provider;
pub mod session;
pub mod settings;
pub mod store;
pub mod view;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogProduct};
pub use checkout::{CheckoutAttempt, CheckoutInitiator, CheckoutOutcome, CheckoutState, RetryPolicy};
pub use currency::{format_currency_value, Currency};
pub use error::{CartError, CartResult};
pub use item::{CartItem, ItemImage, LocalizedFields};
pub use navigation::{NavLink, Navigation, NavigationLoader, TomlNavigationLoader};
pub use provider::{
    BoxedPaymentClient, CheckoutRedirect, PaymentClient, PaymentClientLoader, RedirectToCheckout,
};
pub use session::{
    CheckoutSession, CheckoutSessionRequest, CheckoutSessionResponse, CheckoutUrls,
    SessionEndpoint, SessionProvider,
};
pub use settings::Settings;
pub use store::{CartStore, MemoryCartStore};
pub use view::{CartLine, CartView};
