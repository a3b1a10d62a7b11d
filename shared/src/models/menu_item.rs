//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity (dishes, drinks made to order)
///
/// Menu lines accept a free-text special request per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Unit price, currency-agnostic
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Category reference
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Public URL returned by object storage
    #[serde(default)]
    pub image_url: Option<String>,
}
