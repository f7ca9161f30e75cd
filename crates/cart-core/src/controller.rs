//! # Quantity Controller
//!
//! Button actions of the cart page. Each one is a single delegated store
//! mutation; lower-bound handling belongs to the store.

use crate::error::CartResult;
use crate::item::CartItem;
use crate::store::CartStore;
use tracing::debug;

/// Ask the store to set `item`'s quantity to `current - 1`
pub fn decrement_quantity<S: CartStore + ?Sized>(store: &mut S, item: &CartItem) -> CartResult<()> {
    debug!(item_id = %item.id, quantity = item.quantity, "decrement quantity");
    store.update_item_quantity(&item.id, i64::from(item.quantity) - 1)
}

/// Ask the store to set `item`'s quantity to `current + 1`
pub fn increment_quantity<S: CartStore + ?Sized>(store: &mut S, item: &CartItem) -> CartResult<()> {
    debug!(item_id = %item.id, quantity = item.quantity, "increment quantity");
    store.update_item_quantity(&item.id, i64::from(item.quantity) + 1)
}

/// Ask the store to delete the item
pub fn remove_item<S: CartStore + ?Sized>(store: &mut S, item_id: &str) -> CartResult<()> {
    debug!(item_id, "remove item");
    store.remove_item(item_id)
}

/// Ask the store to clear every item
pub fn empty_cart<S: CartStore + ?Sized>(store: &mut S) {
    debug!("empty cart");
    store.empty_cart();
}

/// Run `action` against the current state of `item_id`.
///
/// Looks the item up first so the mutation always uses the store's
/// quantity, not a stale copy held by the caller.
pub fn with_current_item<S, F>(store: &mut S, item_id: &str, action: F) -> CartResult<()>
where
    S: CartStore + ?Sized,
    F: FnOnce(&mut S, &CartItem) -> CartResult<()>,
{
    let item = store
        .get_item(item_id)
        .cloned()
        .ok_or_else(|| crate::error::CartError::ItemNotFound {
            item_id: item_id.to_string(),
        })?;
    action(store, &item)
}
