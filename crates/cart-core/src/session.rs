//! # Checkout Sessions
//!
//! Wire types for `POST /api/stripe/create-checkout-session` and the
//! server-side trait that turns a request into a provider session.
//!
//! ```text
//!  cart page ──SessionEndpoint──▶ /api/stripe/create-checkout-session
//!                                        │
//!                                        ▼
//!                               SessionProvider (server)
//!                                        │
//!                                        ▼
//!                              hosted checkout provider
//! ```

use crate::currency::Currency;
use crate::error::{CartError, CartResult};
use crate::item::CartItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of a checkout session request, one per checkout attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub cancel_url: String,
    /// Active currency code (e.g. "USD")
    pub currency: String,
    pub items: Vec<CartItem>,
    pub locale: String,
    pub success_url: String,
}

impl CheckoutSessionRequest {
    /// Build the request for the current cart contents
    pub fn new(
        items: &[CartItem],
        currency: Currency,
        locale: impl Into<String>,
        urls: &CheckoutUrls,
    ) -> Self {
        Self {
            cancel_url: urls.cancel_url(),
            currency: currency.code().to_string(),
            items: items.to_vec(),
            locale: locale.into(),
            success_url: urls.success_url(),
        }
    }

    /// Parsed currency, rejecting unsupported codes
    pub fn parsed_currency(&self) -> CartResult<Currency> {
        self.currency.parse()
    }

    /// Server-side validation before anything is sent to a provider
    pub fn validate(&self) -> CartResult<Currency> {
        let currency = self.parsed_currency()?;
        if self.items.is_empty() {
            return Err(CartError::InvalidRequest("Cart has no items".to_string()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(CartError::InvalidRequest(format!(
                "Item {} has quantity 0",
                item.id
            )));
        }
        if let Some(item) = self.items.iter().find(|i| i.price < 0) {
            return Err(CartError::InvalidRequest(format!(
                "Item {} has a negative price",
                item.id
            )));
        }
        if self.success_url.is_empty() || self.cancel_url.is_empty() {
            return Err(CartError::InvalidRequest(
                "success_url and cancel_url are required".to_string(),
            ));
        }
        Ok(currency)
    }
}

/// A checkout session issued by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's opaque session ID
    pub id: String,

    /// Hosted checkout URL, when the provider returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CheckoutSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
        }
    }

    /// Builder: set the hosted checkout URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Success body of the checkout session endpoint: `{ "session": { "id": .. } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub session: CheckoutSession,
}

/// Server-side session creation against a hosted checkout provider
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Create a session for a validated request.
    ///
    /// `idempotency_key` must be unique per checkout attempt.
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
    ) -> CartResult<CheckoutSession>;

    /// Get the provider name (for logging and errors)
    fn provider_name(&self) -> &'static str;
}

/// Page-side client of the checkout session endpoint
#[async_trait]
pub trait SessionEndpoint: Send + Sync {
    /// POST the request and return the issued session.
    ///
    /// `idempotency_key` is the same for every retry of one checkout
    /// attempt, so a retried request cannot open a second session.
    /// Non-2xx answers must surface as [`CartError::SessionRequestFailed`].
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
    ) -> CartResult<CheckoutSession>;
}

/// Return URLs handed to the provider.
///
/// Both default to the page origin, so the shopper lands back on the
/// storefront whether they pay or cancel.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Page origin (e.g., "https://shop.example.com")
    pub origin: String,
    /// Path appended on success (empty for the bare origin)
    pub success_path: String,
    /// Path appended on cancel (empty for the bare origin)
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            success_path: String::new(),
            cancel_path: String::new(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.origin, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.origin, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemImage;
    use serde_json::json;

    fn items() -> Vec<CartItem> {
        let mut item = CartItem::new(
            "sku-1",
            1000,
            ItemImage {
                url: "https://cdn.example.com/a.png".into(),
                width: 1,
                height: 1,
            },
        );
        item.quantity = 2;
        item.item_total = 2000;
        vec![item]
    }

    #[test]
    fn test_checkout_urls_use_origin() {
        let urls = CheckoutUrls::new("https://shop.example.com/");
        assert_eq!(urls.success_url(), "https://shop.example.com");
        assert_eq!(urls.cancel_url(), "https://shop.example.com");
    }

    #[test]
    fn test_request_shape() {
        let urls = CheckoutUrls::new("https://shop.example.com");
        let request = CheckoutSessionRequest::new(&items(), Currency::USD, "en", &urls);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["currency"], json!("USD"));
        assert_eq!(value["locale"], json!("en"));
        assert_eq!(value["cancel_url"], json!("https://shop.example.com"));
        assert_eq!(value["items"][0]["itemTotal"], json!(2000));
    }

    #[test]
    fn test_validate() {
        let urls = CheckoutUrls::default();
        let ok = CheckoutSessionRequest::new(&items(), Currency::GBP, "en", &urls);
        assert_eq!(ok.validate().unwrap(), Currency::GBP);

        let empty = CheckoutSessionRequest::new(&[], Currency::USD, "en", &urls);
        assert!(matches!(empty.validate(), Err(CartError::InvalidRequest(_))));

        let mut bad_currency = ok.clone();
        bad_currency.currency = "BTC".into();
        assert!(matches!(
            bad_currency.validate(),
            Err(CartError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_response_parses_minimal_session() {
        let parsed: CheckoutSessionResponse =
            serde_json::from_value(json!({ "session": { "id": "cs_test_123" } })).unwrap();
        assert_eq!(parsed.session, CheckoutSession::new("cs_test_123"));
    }
}
