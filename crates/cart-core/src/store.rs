//! # Cart Store
//!
//! The authoritative holder of cart items and derived totals.
//!
//! The page only reads from the store and asks it to mutate; every
//! quantity policy lives here. A quantity update to zero (or below)
//! removes the item, so a stored item always has `quantity >= 1`.

use crate::error::{CartError, CartResult};
use crate::item::CartItem;
use serde::{Deserialize, Serialize};

/// Read/mutate capability set of a cart store.
pub trait CartStore {
    /// Items in insertion order
    fn items(&self) -> &[CartItem];

    /// Sum of all line totals, in the smallest currency unit
    fn cart_total(&self) -> i64;

    /// Add `quantity` of `item`; an existing id has its quantity increased
    fn add_item(&mut self, item: CartItem, quantity: u32) -> CartResult<()>;

    /// Set an item's quantity. Values `<= 0` remove the item.
    fn update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CartResult<()>;

    /// Remove an item entirely
    fn remove_item(&mut self, item_id: &str) -> CartResult<()>;

    /// Remove every item
    fn empty_cart(&mut self);

    /// Look up an item by id
    fn get_item(&self, item_id: &str) -> Option<&CartItem> {
        self.items().iter().find(|i| i.id == item_id)
    }

    /// True when the cart holds no items
    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Total number of units across all items
    fn total_items(&self) -> u32 {
        self.items()
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// In-memory cart store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCartStore {
    items: Vec<CartItem>,
    #[serde(rename = "cartTotal")]
    cart_total: i64,
}

impl MemoryCartStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Cart total with the line at `replaced` (or a new line, for `None`)
    /// carrying `line_total`. Fails instead of overflowing.
    fn total_with(&self, replaced: Option<usize>, line_total: i64) -> CartResult<i64> {
        self.items
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != replaced)
            .try_fold(line_total, |acc, (_, item)| acc.checked_add(item.item_total))
            .ok_or_else(|| CartError::InvalidRequest("Cart total is out of range".to_string()))
    }

    /// Totals only shrink on removal, so the sum of the remaining lines fits
    fn recompute_total(&mut self) {
        self.cart_total = self.items.iter().map(|i| i.item_total).sum();
    }

    fn position(&self, item_id: &str) -> CartResult<usize> {
        self.items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CartError::ItemNotFound {
                item_id: item_id.to_string(),
            })
    }
}

impl CartStore for MemoryCartStore {
    fn items(&self) -> &[CartItem] {
        &self.items
    }

    fn cart_total(&self) -> i64 {
        self.cart_total
    }

    fn add_item(&mut self, mut item: CartItem, quantity: u32) -> CartResult<()> {
        if item.id.is_empty() {
            return Err(CartError::InvalidRequest("Item id is empty".to_string()));
        }
        if quantity == 0 {
            return Err(CartError::InvalidRequest(format!(
                "Quantity for {} must be at least 1",
                item.id
            )));
        }
        if item.price < 0 {
            return Err(CartError::InvalidRequest(format!(
                "Price for {} must not be negative",
                item.id
            )));
        }

        match self.items.iter().position(|i| i.id == item.id) {
            Some(idx) => {
                let existing = &self.items[idx];
                let next = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    CartError::InvalidRequest(format!("Quantity for {} is too large", item.id))
                })?;
                let line_total = existing.line_total(next)?;
                let cart_total = self.total_with(Some(idx), line_total)?;
                self.items[idx].set_quantity(next)?;
                self.cart_total = cart_total;
            }
            None => {
                let line_total = item.line_total(quantity)?;
                let cart_total = self.total_with(None, line_total)?;
                item.set_quantity(quantity)?;
                self.items.push(item);
                self.cart_total = cart_total;
            }
        }
        Ok(())
    }

    fn update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CartResult<()> {
        let idx = self.position(item_id)?;
        if quantity <= 0 {
            self.items.remove(idx);
            self.recompute_total();
            return Ok(());
        }

        let quantity = u32::try_from(quantity).map_err(|_| {
            CartError::InvalidRequest(format!("Quantity {} is too large", quantity))
        })?;
        let line_total = self.items[idx].line_total(quantity)?;
        let cart_total = self.total_with(Some(idx), line_total)?;
        self.items[idx].set_quantity(quantity)?;
        self.cart_total = cart_total;
        Ok(())
    }

    fn remove_item(&mut self, item_id: &str) -> CartResult<()> {
        let idx = self.position(item_id)?;
        self.items.remove(idx);
        self.recompute_total();
        Ok(())
    }

    fn empty_cart(&mut self) {
        self.items.clear();
        self.cart_total = 0;
    }
}
