//! # Cart View
//!
//! Render model of the cart page, built from the store and settings.
//! Amounts are formatted here and nowhere else.

use crate::currency::{format_currency_value, Currency};
use crate::item::ItemImage;
use crate::settings::Settings;
use crate::store::CartStore;
use serde::Serialize;

/// One rendered cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    /// Link to the product page
    pub href: String,
    pub image: ItemImage,
    pub quantity: u32,
    /// Line total formatted in the active currency
    pub line_total: String,
}

/// Everything the cart page displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub locale: String,
    pub currency: Currency,
    pub lines: Vec<CartLine>,
    /// Grand total formatted in the active currency
    pub total: String,
}

impl CartView {
    /// Build the view of `store` for `locale`
    pub fn build<S: CartStore + ?Sized>(store: &S, settings: &Settings, locale: &str) -> Self {
        let currency = settings.active_currency;
        let lines = store
            .items()
            .iter()
            .map(|item| CartLine {
                id: item.id.clone(),
                name: item.display_name(locale).to_string(),
                href: format!("/products/{}", item.slug(locale)),
                image: item.image.clone(),
                quantity: item.quantity,
                line_total: format_currency_value(currency, item.item_total),
            })
            .collect();

        Self {
            locale: locale.to_string(),
            currency,
            lines,
            total: format_currency_value(currency, store.cart_total()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller;
    use crate::item::CartItem;
    use crate::store::MemoryCartStore;

    fn image() -> ItemImage {
        ItemImage {
            url: "https://cdn.example.com/p.png".into(),
            width: 200,
            height: 200,
        }
    }

    #[test]
    fn test_single_item_usd() {
        let mut store = MemoryCartStore::new();
        store
            .add_item(
                CartItem::new("sku-1", 1000, image()).with_locale("en", "Shirt", "shirt"),
                2,
            )
            .unwrap();

        let view = CartView::build(&store, &Settings::new(Currency::USD), "en");

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].line_total, "$20.00");
        assert_eq!(view.lines[0].href, "/products/shirt");
        assert_eq!(view.lines[0].name, "Shirt");
        assert_eq!(view.total, "$20.00");
    }

    #[test]
    fn test_lines_match_formatter() {
        let mut store = MemoryCartStore::new();
        store.add_item(CartItem::new("a", 1234, image()), 3).unwrap();
        store.add_item(CartItem::new("b", 99, image()), 1).unwrap();
        let settings = Settings::new(Currency::EUR);

        let view = CartView::build(&store, &settings, "en");

        for (line, item) in view.lines.iter().zip(store.items()) {
            assert_eq!(
                line.line_total,
                format_currency_value(Currency::EUR, item.item_total)
            );
        }
        assert_eq!(
            view.total,
            format_currency_value(Currency::EUR, store.cart_total())
        );
    }

    #[test]
    fn test_removed_item_disappears() {
        let mut store = MemoryCartStore::new();
        store.add_item(CartItem::new("a", 500, image()), 1).unwrap();
        store.add_item(CartItem::new("b", 300, image()), 2).unwrap();

        controller::remove_item(&mut store, "b").unwrap();
        let view = CartView::build(&store, &Settings::default(), "en");

        assert!(view.lines.iter().all(|l| l.id != "b"));
        assert_eq!(view.total, "$5.00");
    }

    #[test]
    fn test_empty_cart_view() {
        let mut store = MemoryCartStore::new();
        store.add_item(CartItem::new("a", 500, image()), 1).unwrap();
        controller::empty_cart(&mut store);

        let view = CartView::build(&store, &Settings::default(), "en");
        assert!(view.is_empty());
        assert_eq!(view.total, "$0.00");
    }
}
