//! Catalog Types
//!
//! The catalog is polymorphic over menu items and inventory items.
//! [`ItemRef`] is the kind-tagged reference stored on cart lines and order
//! details; [`CatalogItem`] is the resolved snapshot.

use super::{InventoryItem, MenuItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Menu,
    Inventory,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu => write!(f, "menu"),
            Self::Inventory => write!(f, "inventory"),
        }
    }
}

/// Reference to a catalog item by kind and identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Menu(i64),
    Inventory(i64),
}

impl ItemRef {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Menu(_) => ItemKind::Menu,
            Self::Inventory(_) => ItemKind::Inventory,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Menu(id) | Self::Inventory(id) => *id,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Resolved catalog item snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogItem {
    Menu(MenuItem),
    Inventory(InventoryItem),
}

impl CatalogItem {
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Menu(m) => ItemRef::Menu(m.id),
            Self::Inventory(i) => ItemRef::Inventory(i.id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Menu(m) => &m.name,
            Self::Inventory(i) => &i.name,
        }
    }

    /// Current unit price: menu price or inventory unit cost
    pub fn unit_price(&self) -> f64 {
        match self {
            Self::Menu(m) => m.price,
            Self::Inventory(i) => i.unit_cost,
        }
    }
}

impl From<MenuItem> for CatalogItem {
    fn from(item: MenuItem) -> Self {
        Self::Menu(item)
    }
}

impl From<InventoryItem> for CatalogItem {
    fn from(item: InventoryItem) -> Self {
        Self::Inventory(item)
    }
}

/// Combined catalog payload returned by the catalog endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPayload {
    #[serde(default, alias = "menu")]
    pub menu_items: Vec<MenuItem>,
    #[serde(default, alias = "inventory")]
    pub inventory_items: Vec<InventoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ref_display_and_kind() {
        let r = ItemRef::Inventory(12);
        assert_eq!(r.kind(), ItemKind::Inventory);
        assert_eq!(r.id(), 12);
        assert_eq!(r.to_string(), "inventory:12");
        assert_eq!(
            serde_json::to_value(ItemRef::Menu(3)).unwrap(),
            serde_json::json!({"type": "menu", "id": 3})
        );
    }

    #[test]
    fn test_catalog_payload_accepts_short_keys() {
        let payload: CatalogPayload = serde_json::from_str(
            r#"{
                "menu": [{"id": 1, "name": "Ramen", "price": 12.5}],
                "inventory": [{"id": 9, "name": "Cola", "unit_cost": 2.0, "stock": 4}]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.menu_items.len(), 1);
        assert_eq!(payload.inventory_items[0].stock, 4);
        assert_eq!(payload.inventory_items[0].max_stock, 0);
    }

    #[test]
    fn test_catalog_item_unit_price() {
        let menu = CatalogItem::from(MenuItem {
            id: 1,
            name: "Ramen".into(),
            price: 12.5,
            description: None,
            category_id: None,
            image_url: None,
        });
        let inv = CatalogItem::from(InventoryItem {
            id: 2,
            name: "Cola".into(),
            unit_cost: 2.0,
            stock: 3,
            max_stock: 24,
            unit: "can".into(),
        });
        assert_eq!(menu.unit_price(), 12.5);
        assert_eq!(inv.unit_price(), 2.0);
        assert_eq!(inv.item_ref(), ItemRef::Inventory(2));
    }
}
