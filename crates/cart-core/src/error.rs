//! # Cart Error Types
//!
//! Typed error handling for the storefront cart.
//! All cart and checkout operations return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for cart and checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Item not present in the cart
    #[error("Item not found in cart: {item_id}")]
    ItemNotFound { item_id: String },

    /// Product id not in the catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Currency not supported
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// The checkout session endpoint answered with a non-2xx status
    #[error("Checkout session request failed with status {http_status}: {body}")]
    SessionRequestFailed {
        http_status: u16,
        body: serde_json::Value,
    },

    /// The request never completed (connect, timeout, broken body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payment provider client or API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CartError {
    /// Returns true if this error is worth retrying.
    ///
    /// Only transport failures qualify: a status answer or a provider
    /// failure would repeat identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CartError::Transport(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::InvalidRequest(_) => 400,
            CartError::ItemNotFound { .. } => 404,
            CartError::ProductNotFound { .. } => 404,
            CartError::UnsupportedCurrency { .. } => 400,
            CartError::SessionRequestFailed { http_status, .. } => {
                if *http_status >= 500 {
                    502
                } else {
                    *http_status
                }
            }
            CartError::Transport(_) => 503,
            CartError::ProviderError { .. } => 502,
            CartError::Serialization(_) => 500,
            CartError::Internal(_) => 500,
        }
    }

    /// Short message suitable for showing to a shopper
    pub fn user_message(&self) -> &'static str {
        match self {
            CartError::SessionRequestFailed { .. } => {
                "We could not start checkout. Please review your cart and try again."
            }
            CartError::Transport(_) => {
                "The checkout service is not reachable right now. Please try again in a moment."
            }
            CartError::ProviderError { .. } => {
                "The payment provider is unavailable. Please try again later."
            }
            CartError::InvalidRequest(_)
            | CartError::UnsupportedCurrency { .. }
            | CartError::ProductNotFound { .. } => {
                "Your cart cannot be checked out as it is."
            }
            _ => "Something went wrong while starting checkout.",
        }
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
