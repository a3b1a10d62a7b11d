//! Data models
//!
//! Wire types exchanged with the order/catalog API.
//! All IDs are `i64`.

pub mod catalog;
pub mod category;
pub mod dining_table;
pub mod inventory_item;
pub mod menu_item;
pub mod order;
mod serde_helpers;

// Re-exports
pub use catalog::*;
pub use category::*;
pub use dining_table::*;
pub use inventory_item::*;
pub use menu_item::*;
pub use order::*;
