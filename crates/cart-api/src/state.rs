//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the cart registry, catalog, navigation, checkout wiring, and
//! configuration.

use cart_core::{
    CartResult, CartStore, Catalog, CheckoutInitiator, CheckoutUrls, Currency, MemoryCartStore,
    NavigationLoader, RetryPolicy, SessionProvider, Settings, TomlNavigationLoader,
};
use cart_stripe::{
    HttpSessionEndpoint, StripeCheckoutSessions, StripeConfig, StripeJs,
    CREATE_CHECKOUT_SESSION_PATH,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Page origin; checkout success and cancel URLs point here
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Supported locales; the first one is the default
    pub locales: Vec<String>,
    /// Currency new carts start with
    pub default_currency: Currency,
    /// Navigation TOML file
    pub navigation_path: String,
    /// Product catalog TOML file
    pub catalog_path: String,
    /// Absolute URL of the checkout session endpoint the page calls
    pub checkout_endpoint_url: String,
    /// Request timeout for the checkout session call
    pub checkout_timeout: Duration,
    /// Retries for transport failures of the checkout session call
    pub checkout_transport_retries: u32,
    /// Most carts held in memory at once
    pub cart_capacity: usize,
    /// Carts untouched for this long are dropped
    pub cart_idle_ttl: Duration,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let locales = parse_locales(&std::env::var("LOCALES").unwrap_or_else(|_| "en".to_string()));
        if locales.is_empty() {
            anyhow::bail!("LOCALES must name at least one locale");
        }

        let default_currency: Currency = std::env::var("DEFAULT_CURRENCY")
            .unwrap_or_else(|_| "USD".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("DEFAULT_CURRENCY: {}", e))?;

        let checkout_endpoint_url = std::env::var("CHECKOUT_ENDPOINT_URL")
            .unwrap_or_else(|_| format!("{}{}", base_url, CREATE_CHECKOUT_SESSION_PATH));

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            locales,
            default_currency,
            navigation_path: std::env::var("NAVIGATION_PATH")
                .unwrap_or_else(|_| "config/navigation.toml".to_string()),
            catalog_path: std::env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "config/catalog.toml".to_string()),
            checkout_endpoint_url,
            checkout_timeout: Duration::from_secs(
                std::env::var("CHECKOUT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            checkout_transport_retries: std::env::var("CHECKOUT_TRANSPORT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            cart_capacity: std::env::var("CART_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            cart_idle_ttl: Duration::from_secs(
                std::env::var("CART_IDLE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(24 * 60 * 60),
            ),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Locale used when none is given
    pub fn default_locale(&self) -> &str {
        self.locales.first().map(|s| s.as_str()).unwrap_or("en")
    }

    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Retry policy for the page's checkout session call
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_transport_retries: self.checkout_transport_retries,
            ..RetryPolicy::default()
        }
    }

    /// Bounds for the cart registry
    pub fn registry_limits(&self) -> RegistryLimits {
        RegistryLimits {
            max_carts: self.cart_capacity.max(1),
            idle_ttl: self.cart_idle_ttl,
        }
    }
}

fn parse_locales(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One shopper's cart and settings
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    pub store: MemoryCartStore,
    pub settings: Settings,
}

/// Bounds on the carts held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    pub max_carts: usize,
    pub idle_ttl: Duration,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_carts: 10_000,
            idle_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

struct CartEntry {
    session: CartSession,
    touched: Instant,
}

/// All carts, keyed by cart id.
///
/// Only carts holding items or non-default settings are stored; anything
/// else reads as a fresh cart.
#[derive(Clone, Default)]
pub struct CartRegistry {
    carts: Arc<RwLock<HashMap<String, CartEntry>>>,
    default_settings: Settings,
    limits: RegistryLimits,
}

impl CartRegistry {
    pub fn new(default_settings: Settings) -> Self {
        Self::with_limits(default_settings, RegistryLimits::default())
    }

    pub fn with_limits(default_settings: Settings, limits: RegistryLimits) -> Self {
        Self {
            carts: Arc::default(),
            default_settings,
            limits,
        }
    }

    fn fresh(&self) -> CartSession {
        CartSession {
            store: MemoryCartStore::new(),
            settings: self.default_settings,
        }
    }

    fn is_fresh(&self, session: &CartSession) -> bool {
        session.store.is_empty() && session.settings == self.default_settings
    }

    /// Copy of a cart; unknown or idle ids read as a fresh cart
    pub async fn snapshot(&self, cart_id: &str) -> CartSession {
        let carts = self.carts.read().await;
        carts
            .get(cart_id)
            .filter(|entry| entry.touched.elapsed() < self.limits.idle_ttl)
            .map(|entry| entry.session.clone())
            .unwrap_or_else(|| self.fresh())
    }

    /// Apply one mutation to a cart.
    ///
    /// An unknown id runs the mutation against a fresh cart, which is only
    /// stored when the mutation succeeds and leaves something to keep. A
    /// cart left empty with default settings is dropped.
    pub async fn update<R>(
        &self,
        cart_id: &str,
        f: impl FnOnce(&mut CartSession) -> CartResult<R>,
    ) -> CartResult<R> {
        let now = Instant::now();
        let mut carts = self.carts.write().await;

        if let Some(entry) = carts.get_mut(cart_id) {
            if now.duration_since(entry.touched) >= self.limits.idle_ttl {
                entry.session = self.fresh();
            }
            let result = f(&mut entry.session)?;
            entry.touched = now;
            let drop_cart = self.is_fresh(&entry.session);
            if drop_cart {
                carts.remove(cart_id);
            }
            return Ok(result);
        }

        let mut session = self.fresh();
        let result = f(&mut session)?;
        if !self.is_fresh(&session) {
            self.make_room(&mut carts, now);
            carts.insert(
                cart_id.to_string(),
                CartEntry {
                    session,
                    touched: now,
                },
            );
        }
        Ok(result)
    }

    /// Drop idle carts, then the least recently used ones until a new
    /// cart fits
    fn make_room(&self, carts: &mut HashMap<String, CartEntry>, now: Instant) {
        let before = carts.len();
        carts.retain(|_, entry| now.duration_since(entry.touched) < self.limits.idle_ttl);
        if carts.len() < before {
            debug!(evicted = before - carts.len(), "Dropped idle carts");
        }

        while carts.len() >= self.limits.max_carts {
            let oldest = carts
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    carts.remove(&id);
                    warn!(cart_id = %id, "Cart registry full, dropped least recently used cart");
                }
                None => break,
            }
        }
    }

    /// Number of carts held
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Cart store per shopper
    pub carts: CartRegistry,
    /// Server-side prices
    pub catalog: Arc<Catalog>,
    /// Navigation loader for page chrome
    pub navigation: Arc<dyn NavigationLoader>,
    /// Server-side checkout session provider
    pub sessions: Arc<dyn SessionProvider>,
    /// Page-side checkout flow
    pub checkout: CheckoutInitiator,
    /// Checkout return URLs
    pub urls: CheckoutUrls,
}

impl AppState {
    /// Create a new AppState wired to Stripe from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let stripe = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;

        let navigation = load_navigation(&config)?;
        let catalog = load_catalog(&config)?;

        let sessions = StripeCheckoutSessions::new(stripe.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let endpoint = HttpSessionEndpoint::new(&config.checkout_endpoint_url, config.checkout_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to initialize checkout endpoint client: {}", e))?;

        let checkout = CheckoutInitiator::new(Arc::new(StripeJs::from_config(&stripe)), Arc::new(endpoint))
            .with_retry(config.retry_policy());

        Ok(Self::from_parts(
            config,
            Arc::new(catalog),
            Arc::new(navigation),
            Arc::new(sessions),
            checkout,
        ))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        config: AppConfig,
        catalog: Arc<Catalog>,
        navigation: Arc<dyn NavigationLoader>,
        sessions: Arc<dyn SessionProvider>,
        checkout: CheckoutInitiator,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.base_url);
        let carts = CartRegistry::with_limits(
            Settings::new(config.default_currency),
            config.registry_limits(),
        );
        Self {
            config,
            carts,
            catalog,
            navigation,
            sessions,
            checkout,
            urls,
        }
    }
}

/// First existing location of a config file, looking upward from the
/// working directory
fn find_config(path: &str) -> Option<String> {
    [
        path.to_string(),
        format!("../{}", path),
        format!("../../{}", path),
    ]
    .into_iter()
    .find(|candidate| std::path::Path::new(candidate).exists())
}

/// Load navigation from config file
fn load_navigation(config: &AppConfig) -> anyhow::Result<TomlNavigationLoader> {
    match find_config(&config.navigation_path) {
        Some(path) => {
            let loader = TomlNavigationLoader::from_path(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path, e))?
                .with_fallback_locale(config.default_locale());
            tracing::info!("Loaded navigation from {}", path);
            Ok(loader)
        }
        None => {
            // Pages render without navigation links if no config found
            tracing::warn!("No navigation config found, pages will render without navigation");
            Ok(TomlNavigationLoader::default())
        }
    }
}

/// Load product catalog from config file
fn load_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    match find_config(&config.catalog_path) {
        Some(path) => {
            let catalog = Catalog::from_path(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path, e))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path);
            Ok(catalog)
        }
        None => {
            tracing::warn!("No product catalog found, nothing can be added to carts");
            Ok(Catalog::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{CartError, CartItem, ItemImage};

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            locales: vec!["en".to_string(), "de".to_string()],
            default_currency: Currency::USD,
            navigation_path: "config/navigation.toml".to_string(),
            catalog_path: "config/catalog.toml".to_string(),
            checkout_endpoint_url: "http://localhost:3000/api/stripe/create-checkout-session"
                .to_string(),
            checkout_timeout: Duration::from_secs(30),
            checkout_transport_retries: 2,
            cart_capacity: 0,
            cart_idle_ttl: Duration::from_secs(60),
        }
    }

    fn item(id: &str, price: i64) -> CartItem {
        CartItem::new(
            id,
            price,
            ItemImage {
                url: "https://cdn.example.com/a.png".into(),
                width: 1,
                height: 1,
            },
        )
    }

    fn add(id: &'static str) -> impl FnOnce(&mut CartSession) -> CartResult<()> {
        move |s| s.store.add_item(item(id, 100), 1)
    }

    #[test]
    fn test_parse_locales() {
        assert_eq!(parse_locales("en, de,,fr "), vec!["en", "de", "fr"]);
        assert!(parse_locales(" , ").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = config();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.default_locale(), "en");
        assert!(config.is_supported_locale("de"));
        assert!(!config.is_supported_locale("fr"));
        assert_eq!(config.retry_policy().max_transport_retries, 2);
        // a zero capacity still holds one cart
        assert_eq!(config.registry_limits().max_carts, 1);
    }

    #[tokio::test]
    async fn test_registry_isolates_carts() {
        let registry = CartRegistry::new(Settings::new(Currency::EUR));

        registry.update("alice", add("a")).await.unwrap();

        let alice = registry.snapshot("alice").await;
        let bob = registry.snapshot("bob").await;

        assert_eq!(alice.store.cart_total(), 100);
        assert!(bob.store.is_empty());
        assert_eq!(bob.settings.active_currency, Currency::EUR);
        // reading does not create carts
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_create_cart() {
        let registry = CartRegistry::new(Settings::default());

        let err = registry
            .update("random", |s| s.store.update_item_quantity("ghost", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));

        // a no-op on an unknown cart is not stored either
        registry
            .update("random", |s| {
                s.store.empty_cart();
                Ok(())
            })
            .await
            .unwrap();

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_emptied_cart_is_dropped() {
        let registry = CartRegistry::new(Settings::default());
        registry.update("c1", add("a")).await.unwrap();
        assert_eq!(registry.len().await, 1);

        registry.update("c1", |s| s.store.remove_item("a")).await.unwrap();
        assert!(registry.is_empty().await);

        // a changed currency is worth keeping on its own
        registry
            .update("c2", |s| {
                s.settings.active_currency = Currency::GBP;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_drops_least_recently_used() {
        let registry = CartRegistry::with_limits(
            Settings::default(),
            RegistryLimits {
                max_carts: 2,
                idle_ttl: Duration::from_secs(3600),
            },
        );

        registry.update("old", add("a")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.update("mid", add("a")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        // touching "old" makes "mid" the least recently used
        registry.update("old", add("b")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.update("new", add("a")).await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.snapshot("old").await.store.items().len(), 2);
        assert!(registry.snapshot("mid").await.store.is_empty());
        assert!(!registry.snapshot("new").await.store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_carts_expire() {
        let registry = CartRegistry::with_limits(
            Settings::default(),
            RegistryLimits {
                max_carts: 100,
                idle_ttl: Duration::from_secs(60),
            },
        );

        registry.update("stale", add("a")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(registry.snapshot("stale").await.store.is_empty());

        registry.update("fresh", add("a")).await.unwrap();
        assert_eq!(registry.len().await, 1);
    }
}
