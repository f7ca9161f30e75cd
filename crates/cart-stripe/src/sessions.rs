//! # Stripe Checkout Sessions
//!
//! Server side of `POST /api/stripe/create-checkout-session`: turns the
//! cart page's request into a Stripe Checkout Session.

use crate::config::StripeConfig;
use async_trait::async_trait;
use cart_core::{
    CartError, CartItem, CartResult, CheckoutSession, CheckoutSessionRequest, SessionProvider,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe Checkout Sessions API client
///
/// Uses Stripe's hosted checkout page for secure payments.
pub struct StripeCheckoutSessions {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutSessions {
    /// Create a new Checkout Sessions client
    pub fn new(config: StripeConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    /// Build the form-encoded body for the Stripe API
    fn build_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let currency = request.currency.to_lowercase();

        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("locale".to_string(), stripe_locale(&request.locale)),
        ];

        for (i, item) in request.items.iter().enumerate() {
            form_params.extend(line_item_params(i, item, &currency, &request.locale));
        }

        form_params.push(("metadata[locale]".to_string(), request.locale.clone()));
        form_params
    }
}

fn line_item_params(
    i: usize,
    item: &CartItem,
    currency: &str,
    locale: &str,
) -> Vec<(String, String)> {
    vec![
        (
            format!("line_items[{}][price_data][currency]", i),
            currency.to_string(),
        ),
        (
            format!("line_items[{}][price_data][unit_amount]", i),
            item.price.to_string(),
        ),
        (
            format!("line_items[{}][price_data][product_data][name]", i),
            item.display_name(locale).to_string(),
        ),
        (
            format!("line_items[{}][price_data][product_data][images][0]", i),
            item.image.url.clone(),
        ),
        (
            format!("line_items[{}][price_data][product_data][metadata][product_id]", i),
            item.id.clone(),
        ),
        (
            format!("line_items[{}][quantity]", i),
            item.quantity.to_string(),
        ),
    ]
}

/// Stripe expects its own locale tags; region suffixes are dropped
/// except where Stripe distinguishes them.
fn stripe_locale(locale: &str) -> String {
    match locale {
        "pt-BR" | "zh-HK" | "zh-TW" | "fr-CA" | "en-GB" | "es-419" => locale.to_string(),
        other => other
            .split(['-', '_'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("auto")
            .to_lowercase(),
    }
}

#[async_trait]
impl SessionProvider for StripeCheckoutSessions {
    #[instrument(skip(self, request), fields(items = request.items.len(), currency = %request.currency))]
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
        idempotency_key: &str,
    ) -> CartResult<CheckoutSession> {
        request.validate()?;

        let form_params = Self::build_form(request);
        debug!(
            "Creating Stripe checkout session: {} items, locale={}",
            request.items.len(),
            request.locale
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| CartError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(CartError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(CartError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse =
            serde_json::from_str(&body).map_err(|e| {
                CartError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        let expires_at = session_response
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        info!(
            session_id = %session_response.id,
            expires_at = ?expires_at,
            "Created Stripe checkout session"
        );

        let session = CheckoutSession::new(session_response.id);
        Ok(match session_response.url {
            Some(url) => session.with_url(url),
            None => session,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
