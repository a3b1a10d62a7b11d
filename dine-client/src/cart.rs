//! Cart store
//!
//! One [`CartLine`] per unit. Menu lines each carry their own request; repeated
//! adds of the same dish are never merged. Lines hold only an item reference,
//! so prices and stock are always read from the [`Catalog`] passed in.

use crate::catalog::Catalog;
use crate::error::CartError;
use crate::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{DetailItem, ItemRef, OrderDetail};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Cart line identifier
pub type LineId = Uuid;

/// What a cart line refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    Menu {
        menu_item_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request: Option<String>,
    },
    Inventory {
        inventory_item_id: i64,
    },
}

impl LineItem {
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Menu { menu_item_id, .. } => ItemRef::Menu(*menu_item_id),
            Self::Inventory { inventory_item_id } => ItemRef::Inventory(*inventory_item_id),
        }
    }

    pub fn request(&self) -> Option<&str> {
        match self {
            Self::Menu { request, .. } => request.as_deref(),
            Self::Inventory { .. } => None,
        }
    }
}

/// One unit in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: LineId,
    #[serde(flatten)]
    pub item: LineItem,
}

impl CartLine {
    fn new(item: LineItem) -> Self {
        Self {
            line_id: Uuid::new_v4(),
            item,
        }
    }

    /// Fresh pending order-detail record for this line
    pub fn to_order_detail(&self) -> OrderDetail {
        let item = match &self.item {
            LineItem::Menu {
                menu_item_id,
                request,
            } => DetailItem::Menu {
                menu_item_id: *menu_item_id,
                request: request.clone(),
            },
            LineItem::Inventory { inventory_item_id } => DetailItem::Inventory {
                inventory_item_id: *inventory_item_id,
            },
        };
        OrderDetail::pending(item)
    }
}

/// Display grouping: menu lines stand alone, inventory lines collapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartGroup {
    Menu(CartLine),
    Inventory {
        inventory_item_id: i64,
        count: usize,
        line_ids: Vec<LineId>,
    },
}

/// Ordered collection of cart lines
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units of `item` currently in the cart
    pub fn count_of(&self, item: ItemRef) -> usize {
        self.lines
            .iter()
            .filter(|l| l.item.item_ref() == item)
            .count()
    }

    /// Units per inventory item id
    pub fn inventory_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for line in &self.lines {
            if let LineItem::Inventory { inventory_item_id } = line.item {
                *counts.entry(inventory_item_id).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Append `quantity` lines of `item`, one per unit
    ///
    /// Inventory adds are checked against `stock - already in cart`; a
    /// rejected add leaves the cart unchanged. This is advisory only, the
    /// authoritative check is [`crate::stock::reconcile`] at submission.
    /// Requests on inventory items are dropped.
    pub fn add_line(
        &mut self,
        catalog: &Catalog,
        item: ItemRef,
        quantity: usize,
        request: Option<String>,
    ) -> Result<Vec<LineId>, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let template = match item {
            ItemRef::Menu(id) => {
                if catalog.find_menu_item(id).is_none() {
                    return Err(CartError::UnknownItem(item));
                }
                LineItem::Menu {
                    menu_item_id: id,
                    request: request.filter(|r| !r.trim().is_empty()),
                }
            }
            ItemRef::Inventory(id) => {
                let inv = catalog
                    .find_inventory_item(id)
                    .ok_or(CartError::UnknownItem(item))?;
                let available = inv.available_after(self.count_of(item));
                if quantity as i64 > available {
                    tracing::info!(
                        item = %item,
                        requested = quantity,
                        available,
                        "Add rejected: not enough stock"
                    );
                    return Err(CartError::InsufficientStock {
                        item,
                        name: inv.name.clone(),
                        requested: quantity,
                        available,
                    });
                }
                if request.is_some() {
                    tracing::debug!(item = %item, "Ignoring request on inventory item");
                }
                LineItem::Inventory {
                    inventory_item_id: id,
                }
            }
        };

        let added: Vec<CartLine> = (0..quantity)
            .map(|_| CartLine::new(template.clone()))
            .collect();
        let ids = added.iter().map(|l| l.line_id).collect();
        self.lines.extend(added);
        tracing::debug!(item = %item, quantity, cart_size = self.lines.len(), "Lines added");
        Ok(ids)
    }

    /// Replace the request of one menu line
    ///
    /// Returns false (no-op) when the line is missing or is an inventory line.
    pub fn update_request(&mut self, line_id: LineId, text: Option<String>) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.line_id == line_id) else {
            return false;
        };
        match &mut line.item {
            LineItem::Menu { request, .. } => {
                *request = text.filter(|t| !t.trim().is_empty());
                true
            }
            LineItem::Inventory { .. } => false,
        }
    }

    /// Remove exactly one line
    pub fn remove_line(&mut self, line_id: LineId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.line_id == line_id)?;
        Some(self.lines.remove(index))
    }

    /// Remove every line of one inventory item; returns how many went
    pub fn remove_all_of_inventory_item(&mut self, inventory_item_id: i64) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| {
            !matches!(l.item, LineItem::Inventory { inventory_item_id: id } if id == inventory_item_id)
        });
        before - self.lines.len()
    }

    /// Sum of current catalog prices over all lines
    ///
    /// Lines whose item left the catalog contribute nothing.
    pub fn calculate_total(&self, catalog: &Catalog) -> Decimal {
        self.lines
            .iter()
            .map(|l| {
                let item = l.item.item_ref();
                match catalog.unit_price(item) {
                    Some(price) => to_decimal(price),
                    None => {
                        tracing::warn!(item = %item, "Cart line references an unknown item");
                        Decimal::ZERO
                    }
                }
            })
            .sum()
    }

    /// [`Self::calculate_total`] rounded for display
    pub fn total_amount(&self, catalog: &Catalog) -> f64 {
        to_f64(self.calculate_total(catalog))
    }

    /// Lines grouped for display, in first-appearance order
    pub fn grouped(&self) -> Vec<CartGroup> {
        let mut groups: Vec<CartGroup> = Vec::new();
        let mut inventory_slot: BTreeMap<i64, usize> = BTreeMap::new();

        for line in &self.lines {
            match line.item {
                LineItem::Menu { .. } => groups.push(CartGroup::Menu(line.clone())),
                LineItem::Inventory { inventory_item_id } => {
                    match inventory_slot.get(&inventory_item_id) {
                        Some(&i) => {
                            if let CartGroup::Inventory {
                                count, line_ids, ..
                            } = &mut groups[i]
                            {
                                *count += 1;
                                line_ids.push(line.line_id);
                            }
                        }
                        None => {
                            inventory_slot.insert(inventory_item_id, groups.len());
                            groups.push(CartGroup::Inventory {
                                inventory_item_id,
                                count: 1,
                                line_ids: vec![line.line_id],
                            });
                        }
                    }
                }
            }
        }
        groups
    }

    /// Order-detail records, one per line, in cart order
    pub fn to_order_details(&self) -> Vec<OrderDetail> {
        self.lines.iter().map(CartLine::to_order_detail).collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CatalogPayload, InventoryItem, LineStatus, MenuItem};
    use std::collections::HashSet;

    fn create_test_catalog() -> Catalog {
        Catalog::new(
            CatalogPayload {
                menu_items: vec![MenuItem {
                    id: 1,
                    name: "Burger".into(),
                    price: 120.0,
                    description: None,
                    category_id: None,
                    image_url: None,
                }],
                inventory_items: vec![
                    InventoryItem {
                        id: 2,
                        name: "Cola".into(),
                        unit_cost: 40.0,
                        stock: 5,
                        max_stock: 24,
                        unit: "can".into(),
                    },
                    InventoryItem {
                        id: 3,
                        name: "Water".into(),
                        unit_cost: 15.5,
                        stock: 3,
                        max_stock: 24,
                        unit: "bottle".into(),
                    },
                ],
            },
            vec![],
        )
    }

    #[test]
    fn test_add_creates_one_line_per_unit() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        let ids = cart
            .add_line(&catalog, ItemRef::Menu(1), 3, Some("no onions".into()))
            .unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(cart.len(), 3);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(cart.lines().iter().all(|l| l.item.request() == Some("no onions")));
    }

    #[test]
    fn test_add_rejects_zero_and_unknown() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        assert_eq!(
            cart.add_line(&catalog, ItemRef::Menu(1), 0, None),
            Err(CartError::ZeroQuantity)
        );
        assert_eq!(
            cart.add_line(&catalog, ItemRef::Menu(99), 1, None),
            Err(CartError::UnknownItem(ItemRef::Menu(99)))
        );
        assert_eq!(
            cart.add_line(&catalog, ItemRef::Inventory(99), 1, None),
            Err(CartError::UnknownItem(ItemRef::Inventory(99)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_inventory_add_capped_by_stock() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Inventory(3), 3, None).unwrap();

        let err = cart
            .add_line(&catalog, ItemRef::Inventory(3), 1, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock { available: 0, requested: 1, .. }
        ));
        assert_eq!(cart.count_of(ItemRef::Inventory(3)), 3);
    }

    #[test]
    fn test_inventory_add_over_remaining_is_rejected_whole() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Inventory(2), 3, None).unwrap();

        let err = cart
            .add_line(&catalog, ItemRef::Inventory(2), 3, None)
            .unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { available: 2, .. }));
        assert_eq!(cart.len(), 3);

        cart.add_line(&catalog, ItemRef::Inventory(2), 2, None).unwrap();
        assert_eq!(cart.count_of(ItemRef::Inventory(2)), 5);
    }

    #[test]
    fn test_inventory_request_dropped() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Inventory(2), 1, Some("cold".into()))
            .unwrap();
        assert_eq!(cart.lines()[0].item.request(), None);
    }

    #[test]
    fn test_update_request() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        let ids = cart.add_line(&catalog, ItemRef::Menu(1), 2, None).unwrap();
        let inv = cart.add_line(&catalog, ItemRef::Inventory(2), 1, None).unwrap();

        assert!(cart.update_request(ids[1], Some("extra cheese".into())));
        assert_eq!(cart.lines()[0].item.request(), None);
        assert_eq!(cart.lines()[1].item.request(), Some("extra cheese"));

        assert!(!cart.update_request(inv[0], Some("ice".into())));
        assert!(!cart.update_request(Uuid::new_v4(), Some("x".into())));

        assert!(cart.update_request(ids[1], Some("   ".into())));
        assert_eq!(cart.lines()[1].item.request(), None);
    }

    #[test]
    fn test_remove_line_removes_exactly_one() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        let ids = cart.add_line(&catalog, ItemRef::Menu(1), 2, None).unwrap();

        let removed = cart.remove_line(ids[0]).unwrap();
        assert_eq!(removed.line_id, ids[0]);
        assert_eq!(cart.len(), 1);
        assert!(cart.remove_line(ids[0]).is_none());
    }

    #[test]
    fn test_remove_all_of_inventory_item() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Inventory(2), 2, None).unwrap();
        cart.add_line(&catalog, ItemRef::Menu(1), 1, None).unwrap();
        cart.add_line(&catalog, ItemRef::Inventory(2), 1, None).unwrap();
        cart.add_line(&catalog, ItemRef::Inventory(3), 1, None).unwrap();

        assert_eq!(cart.remove_all_of_inventory_item(2), 3);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.count_of(ItemRef::Inventory(3)), 1);
        assert_eq!(cart.remove_all_of_inventory_item(2), 0);
    }

    #[test]
    fn test_total_is_order_independent() {
        let catalog = create_test_catalog();

        let mut a = CartStore::new();
        let burger = a.add_line(&catalog, ItemRef::Menu(1), 2, None).unwrap();
        a.add_line(&catalog, ItemRef::Inventory(3), 2, None).unwrap();
        a.remove_line(burger[0]);

        let mut b = CartStore::new();
        b.add_line(&catalog, ItemRef::Inventory(3), 1, None).unwrap();
        b.add_line(&catalog, ItemRef::Menu(1), 1, None).unwrap();
        b.add_line(&catalog, ItemRef::Inventory(3), 1, None).unwrap();

        assert_eq!(a.calculate_total(&catalog), b.calculate_total(&catalog));
        assert_eq!(a.total_amount(&catalog), 151.0);
    }

    #[test]
    fn test_total_reads_current_prices() {
        let mut cart = CartStore::new();
        cart.add_line(&create_test_catalog(), ItemRef::Menu(1), 1, None)
            .unwrap();

        let repriced = Catalog::new(
            CatalogPayload {
                menu_items: vec![MenuItem {
                    id: 1,
                    name: "Burger".into(),
                    price: 130.0,
                    description: None,
                    category_id: None,
                    image_url: None,
                }],
                inventory_items: vec![],
            },
            vec![],
        );
        assert_eq!(cart.total_amount(&repriced), 130.0);
        assert_eq!(cart.total_amount(&Catalog::empty()), 0.0);
    }

    #[test]
    fn test_grouped_view() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Inventory(2), 1, None).unwrap();
        cart.add_line(&catalog, ItemRef::Menu(1), 2, None).unwrap();
        cart.add_line(&catalog, ItemRef::Inventory(2), 2, None).unwrap();

        let groups = cart.grouped();
        assert_eq!(groups.len(), 3);
        assert!(matches!(
            &groups[0],
            CartGroup::Inventory { inventory_item_id: 2, count: 3, line_ids } if line_ids.len() == 3
        ));
        assert!(matches!(groups[1], CartGroup::Menu(_)));
        assert!(matches!(groups[2], CartGroup::Menu(_)));
    }

    #[test]
    fn test_order_details_mirror_lines() {
        let catalog = create_test_catalog();
        let mut cart = CartStore::new();
        cart.add_line(&catalog, ItemRef::Menu(1), 1, Some("no onions".into()))
            .unwrap();
        cart.add_line(&catalog, ItemRef::Inventory(2), 1, None).unwrap();

        let details = cart.to_order_details();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].item.request(), Some("no onions"));
        assert_eq!(details[1].item.item_ref(), ItemRef::Inventory(2));
        assert!(details.iter().all(|d| d.quantity == 1 && d.status == LineStatus::Pending));
    }
}
