//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use cart_core::CartError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_CHECKOUT_BASE_URL: &str = "https://checkout.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...), server side only
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...), used by the page
    pub publishable_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Hosted checkout base URL
    pub checkout_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional:
    /// - `STRIPE_API_BASE_URL`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| {
            CartError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let publishable_key = env::var("STRIPE_PUBLISHABLE_KEY").map_err(|_| {
            CartError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
        })?;

        let mut config = Self::new(secret_key, publishable_key);
        if let Ok(base) = env::var("STRIPE_API_BASE_URL") {
            config = config.with_api_base_url(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            checkout_base_url: DEFAULT_CHECKOUT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Check key formats and that both keys belong to the same mode
    pub fn validate(&self) -> Result<(), CartError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(CartError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        validate_publishable_key(&self.publishable_key)?;

        if self.is_test_mode() != self.publishable_key.starts_with("pk_test_") {
            return Err(CartError::Configuration(
                "STRIPE_SECRET_KEY and STRIPE_PUBLISHABLE_KEY must both be test or both be live keys"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set custom hosted checkout base URL
    pub fn with_checkout_base_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Publishable keys are the only Stripe credential the page holds
pub(crate) fn validate_publishable_key(key: &str) -> Result<(), CartError> {
    if !key.starts_with("pk_test_") && !key.starts_with("pk_live_") {
        return Err(CartError::Configuration(
            "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789");
        assert!(config.validate().is_ok());
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());

        let config = StripeConfig::new("sk_live_abc123", "pk_live_xyz789");
        assert!(config.validate().is_ok());
        assert!(config.is_live_mode());
    }

    #[test]
    fn test_invalid_keys() {
        assert!(StripeConfig::new("nope", "pk_test_x").validate().is_err());
        assert!(StripeConfig::new("sk_test_x", "nope").validate().is_err());
        // mixed modes
        assert!(StripeConfig::new("sk_test_x", "pk_live_y").validate().is_err());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = StripeConfig::new("sk_test_a", "pk_test_b").with_api_base_url("http://127.0.0.1:9999/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }
}
