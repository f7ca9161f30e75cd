//! # cart-stripe
//!
//! Stripe hosted checkout for storefront-cart.
//!
//! This crate provides both halves of the checkout hand-off:
//!
//! 1. **Server side** - `StripeCheckoutSessions`
//!    - Implements `SessionProvider` over the Checkout Sessions API
//!    - Backs `POST /api/stripe/create-checkout-session`
//!
//! 2. **Page side** - `HttpSessionEndpoint` and `StripeJs`
//!    - `HttpSessionEndpoint` posts the cart to the session endpoint
//!    - `StripeJs` lazily initializes the publishable-key client that
//!      redirects the shopper to the hosted checkout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_core::CheckoutInitiator;
//! use cart_stripe::{HttpSessionEndpoint, StripeConfig, StripeJs};
//! use std::sync::Arc;
//!
//! let config = StripeConfig::from_env()?;
//! let endpoint = HttpSessionEndpoint::for_origin("https://shop.example.com", timeout)?;
//! let initiator = CheckoutInitiator::new(
//!     Arc::new(StripeJs::from_config(&config)),
//!     Arc::new(endpoint),
//! );
//!
//! let attempt = initiator.checkout(&request).await;
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod sessions;

// Re-exports
pub use client::{StripeClient, StripeJs};
pub use config::StripeConfig;
pub use endpoint::{HttpSessionEndpoint, CREATE_CHECKOUT_SESSION_PATH, IDEMPOTENCY_KEY_HEADER};
pub use sessions::StripeCheckoutSessions;
