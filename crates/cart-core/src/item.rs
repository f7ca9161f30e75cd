//! # Cart Items
//!
//! Line items as held by the cart store and sent to the checkout endpoint.
//! Localized display fields are keyed by locale and serialized at the top
//! level of the item, e.g. `{"id": "sku-1", ..., "en": {"name": .., "slug": ..}}`.

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Per-locale display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedFields {
    pub name: String,
    pub slug: String,
}

/// A line item in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique item key (product / variant id)
    pub id: String,

    /// Unit price in the smallest currency unit
    pub price: i64,

    /// Quantity in the cart
    #[serde(default)]
    pub quantity: u32,

    /// Line total (`price * quantity`), maintained by the store
    #[serde(default)]
    pub item_total: i64,

    /// Image reference
    pub image: ItemImage,

    /// Display fields keyed by locale
    #[serde(flatten)]
    pub localizations: BTreeMap<String, LocalizedFields>,
}

impl CartItem {
    /// Create an item with quantity 0; the store sets quantity and total on insert
    pub fn new(id: impl Into<String>, price: i64, image: ItemImage) -> Self {
        Self {
            id: id.into(),
            price,
            quantity: 0,
            item_total: 0,
            image,
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

    /// Display fields for `locale`, falling back to the first available locale
    pub fn localized(&self, locale: &str) -> Option<&LocalizedFields> {
        self.localizations
            .get(locale)
            .or_else(|| self.localizations.values().next())
    }

    /// Display name for `locale`, or the item id when no fields exist
    pub fn display_name(&self, locale: &str) -> &str {
        self.localized(locale)
            .map(|f| f.name.as_str())
            .unwrap_or(self.id.as_str())
    }

    /// Product slug for `locale`, or the item id when no fields exist
    pub fn slug(&self, locale: &str) -> &str {
        self.localized(locale)
            .map(|f| f.slug.as_str())
            .unwrap_or(self.id.as_str())
    }

    /// Line total for `quantity` units, rejecting amounts outside `i64`
    pub fn line_total(&self, quantity: u32) -> CartResult<i64> {
        self.price.checked_mul(i64::from(quantity)).ok_or_else(|| {
            CartError::InvalidRequest(format!(
                "Line total for {} x {} is out of range",
                self.id, quantity
            ))
        })
    }

    /// Set the quantity and recompute the line total.
    ///
    /// The item is left untouched when the new total does not fit.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> CartResult<()> {
        let item_total = self.line_total(quantity)?;
        self.quantity = quantity;
        self.item_total = item_total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shirt() -> CartItem {
        CartItem::new(
            "sku-1",
            1000,
            ItemImage {
                url: "https://cdn.example.com/shirt.png".into(),
                width: 400,
                height: 300,
            },
        )
        .with_locale("en", "Shirt", "shirt")
        .with_locale("de", "Hemd", "hemd")
    }

    #[test]
    fn test_localized_fallback() {
        let item = shirt();
        assert_eq!(item.display_name("de"), "Hemd");
        // BTreeMap order: "de" comes first
        assert_eq!(item.display_name("fr"), "Hemd");

        let bare = CartItem::new("sku-9", 1, item.image.clone());
        assert_eq!(bare.display_name("en"), "sku-9");
        assert_eq!(bare.slug("en"), "sku-9");
    }

    #[test]
    fn test_wire_shape() {
        let mut item = shirt();
        item.set_quantity(2).unwrap();

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["itemTotal"], json!(2000));
        assert_eq!(value["en"]["slug"], json!("shirt"));
        assert_eq!(value["image"]["width"], json!(400));

        let back: CartItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_line_total_overflow_leaves_item_unchanged() {
        let mut item = CartItem::new("big", i64::MAX / 2 + 1, shirt().image);
        item.set_quantity(1).unwrap();

        let err = item.set_quantity(2).unwrap_err();
        assert!(matches!(err, CartError::InvalidRequest(_)));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.item_total, i64::MAX / 2 + 1);
    }
}
