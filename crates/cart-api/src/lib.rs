//! # cart-api
//!
//! HTTP layer for storefront-cart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The server-rendered cart page and its quantity/checkout actions
//! - A JSON cart API
//! - The checkout session endpoint backed by Stripe
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/{locale}/cart/{cart_id}` | Cart page |
//! | POST | `/{locale}/cart/{cart_id}/items/{item_id}/{increment,decrement,remove}` | Quantity controls |
//! | POST | `/{locale}/cart/{cart_id}/empty` | Empty cart |
//! | POST | `/{locale}/cart/{cart_id}/currency` | Switch currency |
//! | POST | `/{locale}/cart/{cart_id}/checkout` | Start hosted checkout |
//! | GET | `/api/carts/{cart_id}` | Cart JSON |
//! | POST | `/api/carts/{cart_id}/items` | Add item |
//! | POST | `/api/stripe/create-checkout-session` | Create checkout session |

pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, CartRegistry, CartSession};
