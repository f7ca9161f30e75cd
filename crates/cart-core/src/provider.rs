//! # Payment Provider Client
//!
//! Page-side handle to a hosted checkout provider.
//!
//! The handle is produced by an asynchronous [`PaymentClientLoader`] so a
//! provider can do its setup (key checks, script load, etc.) once and on
//! first use. Tests substitute their own loader.

use crate::error::CartResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options for [`PaymentClient::redirect_to_checkout`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectToCheckout {
    pub session_id: String,
    /// Hosted URL issued with the session, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Where the shopper is sent to pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: String,
}

/// A ready-to-use provider client
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Hand the session to the provider and obtain the hosted checkout location
    async fn redirect_to_checkout(&self, options: RedirectToCheckout)
        -> CartResult<CheckoutRedirect>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Shared, dynamically dispatched provider client
pub type BoxedPaymentClient = Arc<dyn PaymentClient>;

/// Asynchronous factory for the provider client
#[async_trait]
pub trait PaymentClientLoader: Send + Sync {
    /// Return the client, initializing it on first call
    async fn load(&self) -> CartResult<BoxedPaymentClient>;
}
