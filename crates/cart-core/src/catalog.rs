//! # Product Catalog
//!
//! Server-side source of truth for prices. Items added to a cart and items
//! sent to the checkout session endpoint are resolved here by id; the
//! client's own `price` is never trusted.
//!
//! ```toml
//! [[products]]
//! id = "sku-1"
//! price = 1000
//! image = { url = "https://cdn.example.com/shirt.png", width = 400, height = 300 }
//! en = { name = "Shirt", slug = "shirt" }
//! ```

use crate::error::{CartError, CartResult};
use crate::item::{CartItem, ItemImage, LocalizedFields};
use crate::session::CheckoutSessionRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A sellable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,

    /// Unit price in the smallest currency unit
    pub price: i64,

    pub image: ItemImage,

    /// Inactive products stay resolvable for display but cannot be bought
    #[serde(default = "default_active")]
    pub active: bool,

    /// Display fields keyed by locale
    #[serde(flatten)]
    pub localizations: BTreeMap<String, LocalizedFields>,
}

fn default_active() -> bool {
    true
}

impl CatalogProduct {
    pub fn new(id: impl Into<String>, price: i64, image: ItemImage) -> Self {
        Self {
            id: id.into(),
            price,
            image,
            active: true,
            localizations: BTreeMap::new(),
        }
    }

    /// Builder: add display fields for a locale
    pub fn with_locale(
        mut self,
        locale: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        self.localizations.insert(
            locale.into(),
            LocalizedFields {
                name: name.into(),
                slug: slug.into(),
            },
        );
        self
    }

    /// Builder: mark the product unavailable
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Fresh cart item for this product, quantity 0
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone(),
            price: self.price,
            quantity: 0,
            item_total: 0,
            image: self.image.clone(),
            localizations: self.localizations.clone(),
        }
    }
}

/// Product catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: CatalogProduct) {
        self.products.push(product);
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> CartResult<Self> {
        let catalog: Catalog = toml::from_str(toml_str)
            .map_err(|e| CartError::Configuration(format!("Invalid catalog: {}", e)))?;
        if let Some(product) = catalog.products.iter().find(|p| p.price < 0) {
            return Err(CartError::Configuration(format!(
                "Product {} has a negative price",
                product.id
            )));
        }
        Ok(catalog)
    }

    /// Load catalog from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> CartResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// A product that can be bought right now
    pub fn purchasable(&self, id: &str) -> CartResult<&CatalogProduct> {
        let product = self.get(id).ok_or_else(|| CartError::ProductNotFound {
            product_id: id.to_string(),
        })?;
        if !product.active {
            return Err(CartError::InvalidRequest(format!(
                "Product is not available: {}",
                id
            )));
        }
        Ok(product)
    }

    /// Cart item for `id`, priced from the catalog
    pub fn cart_item(&self, id: &str) -> CartResult<CartItem> {
        Ok(self.purchasable(id)?.to_cart_item())
    }

    /// Copy of `request` whose items carry catalog prices and display fields.
    ///
    /// Only the id and quantity of each incoming item are kept.
    pub fn price_request(&self, request: &CheckoutSessionRequest) -> CartResult<CheckoutSessionRequest> {
        let items = request
            .items
            .iter()
            .map(|incoming| {
                let mut item = self.cart_item(&incoming.id)?;
                item.set_quantity(incoming.quantity)?;
                Ok::<_, CartError>(item)
            })
            .collect::<CartResult<Vec<_>>>()?;

        Ok(CheckoutSessionRequest {
            items,
            ..request.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::session::CheckoutUrls;

    const CATALOG: &str = r#"
[[products]]
id = "sku-1"
price = 1000
image = { url = "https://cdn.example.com/shirt.png", width = 400, height = 300 }
en = { name = "Shirt", slug = "shirt" }
de = { name = "Hemd", slug = "hemd" }

[[products]]
id = "retired"
price = 50
active = false
image = { url = "https://cdn.example.com/old.png", width = 1, height = 1 }
"#;

    #[test]
    fn test_from_toml() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);

        let shirt = catalog.get("sku-1").unwrap();
        assert_eq!(shirt.price, 1000);
        assert!(shirt.active);
        assert_eq!(shirt.localizations["de"].name, "Hemd");
        assert_eq!(shirt.image.width, 400);
    }

    #[test]
    fn test_rejects_negative_prices() {
        let err = Catalog::from_toml(
            r#"
[[products]]
id = "x"
price = -1
image = { url = "u", width = 1, height = 1 }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CartError::Configuration(_)));
    }

    #[test]
    fn test_cart_item_lookup() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();

        let item = catalog.cart_item("sku-1").unwrap();
        assert_eq!(item.price, 1000);
        assert_eq!(item.display_name("en"), "Shirt");

        assert!(matches!(
            catalog.cart_item("nope"),
            Err(CartError::ProductNotFound { .. })
        ));
        assert!(matches!(
            catalog.cart_item("retired"),
            Err(CartError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_price_request_ignores_client_prices() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();

        let mut tampered = catalog.cart_item("sku-1").unwrap();
        tampered.price = 1;
        tampered.quantity = 3;
        tampered.item_total = 3;
        tampered.image.url = "https://evil.example.com/x.png".into();

        let request = CheckoutSessionRequest::new(
            &[tampered],
            Currency::USD,
            "en",
            &CheckoutUrls::new("https://shop.example.com"),
        );
        let priced = catalog.price_request(&request).unwrap();

        assert_eq!(priced.items[0].price, 1000);
        assert_eq!(priced.items[0].quantity, 3);
        assert_eq!(priced.items[0].item_total, 3000);
        assert_eq!(priced.items[0].image.url, "https://cdn.example.com/shirt.png");
        assert_eq!(priced.currency, "USD");
        assert_eq!(priced.success_url, request.success_url);
    }

    #[test]
    fn test_price_request_unknown_product() {
        let catalog = Catalog::from_toml(CATALOG).unwrap();
        let mut ghost = catalog.cart_item("sku-1").unwrap();
        ghost.id = "ghost".into();

        let request = CheckoutSessionRequest::new(
            &[ghost],
            Currency::USD,
            "en",
            &CheckoutUrls::default(),
        );
        let err = catalog.price_request(&request).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
