//! Dine Client - customer ordering core
//!
//! Table session resolution, catalog cache, cart, stock reconciliation,
//! order submission and order history against the order/catalog API.

pub mod api;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod http;
pub mod http_oneshot;
pub mod logger;
pub mod money;
pub mod session;
pub mod stock;
pub mod submit;

pub use api::OrderApi;
pub use cart::{CartGroup, CartLine, CartStore, LineId, LineItem};
pub use catalog::{Catalog, CatalogCache, CategoryGroup, UNKNOWN_ITEM_NAME};
pub use client::DineClient;
pub use config::ClientConfig;
pub use error::{CartError, ClientError, ClientResult, DineError, DineResult};
pub use history::{OrderHistory, OrderLineView};
pub use http::{HttpClient, NetworkHttpClient};
pub use http_oneshot::OneshotHttpClient;
pub use money::PriceBreakdown;
pub use session::{SessionContext, SessionRegistry, SessionStorage, normalize_token};
pub use stock::StockShortfall;

// Re-export shared types for convenience
pub use shared::models::{ItemKind, ItemRef, Order, OrderStatus};
