//! # Checkout Session Endpoint Client
//!
//! The cart page's HTTP call to `POST /api/stripe/create-checkout-session`.

use async_trait::async_trait;
use cart_core::{
    CartError, CartResult, CheckoutSession, CheckoutSessionRequest, CheckoutSessionResponse,
    SessionEndpoint,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Path of the session endpoint, relative to the page origin
pub const CREATE_CHECKOUT_SESSION_PATH: &str = "/api/stripe/create-checkout-session";

/// Header carrying the checkout attempt's idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// JSON-over-HTTP client for the checkout session endpoint
#[derive(Debug, Clone)]
pub struct HttpSessionEndpoint {
    url: String,
    client: Client,
}

impl HttpSessionEndpoint {
    /// Client for the endpoint at an absolute `url`
    pub fn new(url: impl Into<String>, timeout: Duration) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Client for the endpoint served under `origin`
    pub fn for_origin(origin: &str, timeout: Duration) -> CartResult<Self> {
        Self::new(
            format!(
                "{}{}",
                origin.trim_end_matches('/'),
                CREATE_CHECKOUT_SESSION_PATH
            ),
            timeout,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SessionEndpoint for HttpSessionEndpoint {
    #[instrument(skip(self, request), fields(url = %self.url))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
    ) -> CartResult<CheckoutSession> {
        let response = self
            .client
            .post(&self.url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CartError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Checkout session endpoint refused request");
            let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
            return Err(CartError::SessionRequestFailed {
                http_status: status.as_u16(),
                body,
            });
        }

        let parsed: CheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::Serialization(format!("Invalid checkout session response: {}", e))
        })?;

        debug!(session_id = %parsed.session.id, "Checkout session issued");
        Ok(parsed.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{CartItem, CheckoutUrls, Currency, ItemImage};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CheckoutSessionRequest {
        let mut item = CartItem::new(
            "sku-1",
            1000,
            ItemImage {
                url: "https://cdn.example.com/a.png".into(),
                width: 1,
                height: 1,
            },
        )
        .with_locale("en", "Shirt", "shirt");
        item.quantity = 2;
        item.item_total = 2000;
        CheckoutSessionRequest::new(
            &[item],
            Currency::USD,
            "en",
            &CheckoutUrls::new("https://shop.example.com"),
        )
    }

    async fn endpoint(server: &MockServer) -> HttpSessionEndpoint {
        HttpSessionEndpoint::for_origin(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_posts_request_and_parses_session() {
        let server = MockServer::start().await;
        let request = request();

        Mock::given(method("POST"))
            .and(path(CREATE_CHECKOUT_SESSION_PATH))
            .and(header(IDEMPOTENCY_KEY_HEADER, "attempt-1"))
            .and(body_json(&request))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "session": { "id": "cs_test_123" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = endpoint(&server)
            .await
            .create_checkout_session(&request, "attempt-1")
            .await
            .unwrap();
        assert_eq!(session, CheckoutSession::new("cs_test_123"));
    }

    #[tokio::test]
    async fn test_non_success_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_CHECKOUT_SESSION_PATH))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "bad request" })),
            )
            .mount(&server)
            .await;

        let err = endpoint(&server)
            .await
            .create_checkout_session(&request(), "attempt-1")
            .await
            .unwrap_err();

        match err {
            CartError::SessionRequestFailed { http_status, body } => {
                assert_eq!(http_status, 400);
                assert_eq!(body, json!({ "message": "bad request" }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_kept_as_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = endpoint(&server)
            .await
            .create_checkout_session(&request(), "attempt-1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CartError::SessionRequestFailed { http_status: 502, ref body }
                if body == &json!("upstream down")
        ));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "flat" })))
            .mount(&server)
            .await;

        let err = endpoint(&server)
            .await
            .create_checkout_session(&request(), "attempt-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let endpoint =
            HttpSessionEndpoint::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
        let err = endpoint
            .create_checkout_session(&request(), "attempt-1")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
