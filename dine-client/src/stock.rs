//! Stock reconciliation
//!
//! The authoritative pre-submit gate. Cart inventory lines are counted per
//! item and compared against the catalog's current stock; an item is flagged
//! only when the count is strictly greater. Any flag blocks the whole order.

use crate::cart::CartStore;
use crate::catalog::{Catalog, UNKNOWN_ITEM_NAME};
use crate::{DineError, DineResult};
use serde::{Deserialize, Serialize};
use shared::models::ItemRef;

/// One over-committed inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortfall {
    pub item: ItemRef,
    pub name: String,
    /// Units of this item in the cart
    pub in_cart: usize,
    /// Current stock; 0 when the item left the catalog
    pub available: i64,
}

impl StockShortfall {
    /// Lines to remove before the order can go through
    pub fn excess(&self) -> usize {
        self.in_cart.saturating_sub(self.available.max(0) as usize)
    }
}

/// Every inventory item whose cart count exceeds current stock
pub fn find_shortfalls(cart: &CartStore, catalog: &Catalog) -> Vec<StockShortfall> {
    cart.inventory_counts()
        .into_iter()
        .filter_map(|(id, in_cart)| {
            let (name, available) = match catalog.find_inventory_item(id) {
                Some(item) => (item.name.clone(), item.stock),
                None => (UNKNOWN_ITEM_NAME.to_string(), 0),
            };
            (in_cart as i64 > available).then(|| StockShortfall {
                item: ItemRef::Inventory(id),
                name,
                in_cart,
                available: available.max(0),
            })
        })
        .collect()
}

/// Block submission when any inventory item is over-committed
pub fn reconcile(cart: &CartStore, catalog: &Catalog) -> DineResult<()> {
    let shortfalls = find_shortfalls(cart, catalog);
    if shortfalls.is_empty() {
        return Ok(());
    }
    for s in &shortfalls {
        tracing::warn!(
            item = %s.item,
            in_cart = s.in_cart,
            available = s.available,
            "Stock conflict"
        );
    }
    Err(DineError::StockConflict(shortfalls))
}
