//! # Stripe Page Client
//!
//! Page-side Stripe handle: the publishable-key client that sends a
//! shopper from the cart page to the hosted checkout for a session.
//!
//! [`StripeJs`] initializes the client once, on first checkout, and hands
//! out the shared instance afterwards.

use crate::config::validate_publishable_key;
use async_trait::async_trait;
use cart_core::{
    BoxedPaymentClient, CartError, CartResult, CheckoutRedirect, PaymentClient,
    PaymentClientLoader, RedirectToCheckout,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Initialized Stripe page client
#[derive(Debug, Clone)]
pub struct StripeClient {
    publishable_key: String,
    checkout_base_url: String,
}

impl StripeClient {
    pub fn is_test_mode(&self) -> bool {
        self.publishable_key.starts_with("pk_test_")
    }
}

#[async_trait]
impl PaymentClient for StripeClient {
    async fn redirect_to_checkout(
        &self,
        options: RedirectToCheckout,
    ) -> CartResult<CheckoutRedirect> {
        let session_id = options.session_id.trim();
        if session_id.is_empty() {
            return Err(provider_error("redirectToCheckout requires a sessionId"));
        }

        // A test key cannot open a live session and vice versa
        if self.is_test_mode() && session_id.starts_with("cs_live_") {
            return Err(provider_error("live session used with a test publishable key"));
        }
        if !self.is_test_mode() && session_id.starts_with("cs_test_") {
            return Err(provider_error("test session used with a live publishable key"));
        }

        let url = options
            .url
            .unwrap_or_else(|| format!("{}/c/pay/{}", self.checkout_base_url, session_id));

        debug!(session_id, %url, "Stripe redirect");
        Ok(CheckoutRedirect {
            session_id: session_id.to_string(),
            url,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

fn provider_error(message: &str) -> CartError {
    CartError::ProviderError {
        provider: "stripe".to_string(),
        message: message.to_string(),
    }
}

/// Lazy loader for [`StripeClient`]
#[derive(Debug)]
pub struct StripeJs {
    publishable_key: String,
    checkout_base_url: String,
    client: OnceCell<Arc<StripeClient>>,
}

impl StripeJs {
    pub fn new(publishable_key: impl Into<String>, checkout_base_url: impl Into<String>) -> Self {
        Self {
            publishable_key: publishable_key.into(),
            checkout_base_url: checkout_base_url.into().trim_end_matches('/').to_string(),
            client: OnceCell::new(),
        }
    }

    /// Loader for the keys in a [`StripeConfig`](crate::StripeConfig)
    pub fn from_config(config: &crate::StripeConfig) -> Self {
        Self::new(&config.publishable_key, &config.checkout_base_url)
    }

    /// True once the client has been initialized
    pub fn is_loaded(&self) -> bool {
        self.client.initialized()
    }
}

#[async_trait]
impl PaymentClientLoader for StripeJs {
    async fn load(&self) -> CartResult<BoxedPaymentClient> {
        let client = self
            .client
            .get_or_try_init(|| async {
                validate_publishable_key(&self.publishable_key)?;
                info!("Stripe client initialized");
                Ok::<_, CartError>(Arc::new(StripeClient {
                    publishable_key: self.publishable_key.clone(),
                    checkout_base_url: self.checkout_base_url.clone(),
                }))
            })
            .await?;
        Ok(client.clone() as BoxedPaymentClient)
    }
}
