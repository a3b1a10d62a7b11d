//! Inventory Item Model

use serde::{Deserialize, Serialize};

/// Stock-tracked item (bottled drinks, packaged goods)
///
/// Inventory items never carry special requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    /// Price charged per unit
    pub unit_cost: f64,
    /// Units currently on hand
    pub stock: i64,
    /// Storage capacity
    #[serde(default)]
    pub max_stock: i64,
    /// Unit label, e.g. "bottle"
    #[serde(default)]
    pub unit: String,
}

impl InventoryItem {
    /// Units still available once `reserved` units are taken
    pub fn available_after(&self, reserved: usize) -> i64 {
        (self.stock - reserved as i64).max(0)
    }
}
