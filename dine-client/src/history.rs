//! Order history aggregation
//!
//! Two different totals live here and must not be mixed up:
//! [`compute_order_total`] is the persisted snapshot taken at submission,
//! [`reconstructed_total`] re-prices the lines against today's catalog and is
//! for display only. The grand total always sums persisted totals.

use crate::api::OrderApi;
use crate::catalog::Catalog;
use crate::http::HttpClient;
use crate::money::{sum_amounts, to_decimal, to_f64};
use crate::session::{SessionContext, normalize_token};
use crate::{DineError, DineResult};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use shared::models::{ItemRef, LineStatus, Order, OrderRecord};

/// Result of a history load
///
/// `error` is set when the fetch failed and `orders` fell back to what this
/// session already knew. `malformed` lists orders shown without lines and
/// rows left out because they could not be read at all.
#[derive(Debug, Default)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub malformed: Vec<DineError>,
    pub error: Option<DineError>,
}

impl OrderHistory {
    pub fn grand_total(&self) -> f64 {
        compute_grand_total(&self.orders)
    }
}

/// One order line re-joined against the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineView {
    pub item: ItemRef,
    /// Catalog name or "Unknown Item"
    pub name: String,
    /// Current catalog price; 0 for unknown items
    pub unit_price: f64,
    pub quantity: u32,
    pub status: LineStatus,
    pub request: Option<String>,
    pub known: bool,
}

/// Normalize fetched rows into orders, one row at a time
///
/// Malformed details become an order without lines plus an entry in the
/// returned error list. A row that does not decode as an order is left out
/// and reported the same way.
pub fn normalize_records(rows: Vec<Value>) -> (Vec<Order>, Vec<DineError>) {
    let mut orders = Vec::with_capacity(rows.len());
    let mut malformed = Vec::new();
    for row in rows {
        let order_id = row.get("id").and_then(Value::as_i64);
        let record = match serde_json::from_value::<OrderRecord>(row) {
            Ok(record) => record,
            Err(source) => {
                tracing::warn!(?order_id, error = %source, "Unreadable order row");
                malformed.push(DineError::MalformedOrder { order_id, source });
                continue;
            }
        };
        let (order, error) = record.normalize();
        if let Some(source) = error {
            tracing::warn!(order_id = order.id, error = %source, "Malformed order details");
            malformed.push(DineError::MalformedOrderDetails {
                order_id: order.id,
                source,
            });
        }
        orders.push(order);
    }
    (orders, malformed)
}

/// Fetch the table's orders, degrading to local history on failure
///
/// Only an invalid session is an error; fetch failures are reported in
/// [`OrderHistory::error`].
pub async fn load_orders<C: HttpClient>(
    ctx: &SessionContext,
    api: &OrderApi<C>,
    raw_token: &str,
) -> DineResult<OrderHistory> {
    let table_id = ctx.resolve_table(api, raw_token).await?;
    let token = normalize_token(raw_token);

    match api.fetch_orders(&token).await {
        Ok(rows) => {
            let (orders, malformed) = normalize_records(rows);
            tracing::debug!(table_id, count = orders.len(), "Order history loaded");
            ctx.merge_orders(orders);
            Ok(OrderHistory {
                orders: ctx.orders(),
                malformed,
                error: None,
            })
        }
        Err(e) => {
            tracing::warn!(table_id, error = %e, "Order history unavailable");
            Ok(OrderHistory {
                orders: ctx.orders(),
                malformed: Vec::new(),
                error: Some(DineError::HistoryUnavailable(e)),
            })
        }
    }
}

/// Persisted total of one order
pub fn compute_order_total(order: &Order) -> f64 {
    order.total_amount
}

/// Sum of persisted order totals
pub fn compute_grand_total(orders: &[Order]) -> f64 {
    sum_amounts(orders.iter().map(compute_order_total))
}

/// Lines of `order` with current names and prices
pub fn order_lines(order: &Order, catalog: &Catalog) -> Vec<OrderLineView> {
    order
        .details
        .iter()
        .map(|detail| {
            let item = detail.item.item_ref();
            let unit_price = catalog.unit_price(item);
            OrderLineView {
                item,
                name: catalog.display_name(item).to_string(),
                unit_price: unit_price.unwrap_or(0.0),
                quantity: detail.quantity,
                status: detail.status,
                request: detail.item.request().map(str::to_string),
                known: unit_price.is_some(),
            }
        })
        .collect()
}

/// Best-effort re-priced total; differs from the persisted one when prices
/// changed or items were deleted
pub fn reconstructed_total(order: &Order, catalog: &Catalog) -> f64 {
    let total: Decimal = order_lines(order, catalog)
        .iter()
        .map(|l| to_decimal(l.unit_price) * Decimal::from(l.quantity))
        .sum();
    to_f64(total)
}
