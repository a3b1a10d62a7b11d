//! Order Model
//!
//! Orders are persisted by the order API with their line records serialized
//! to JSON text (`order_details`). Rows read back may carry that column either
//! as the text blob or as an already-decoded array; [`OrderRecord::normalize`]
//! is the single place where both forms become one [`Order`].

use super::ItemRef;
use super::serde_helpers::{flexible_amount, flexible_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(alias = "Processing", alias = "In Progress", alias = "in_progress")]
    InProgress,
    Completed,
}

/// Per-line kitchen status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    #[default]
    Pending,
    Completed,
}

/// The catalog side of an order-detail record, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailItem {
    Menu {
        menu_item_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request: Option<String>,
    },
    Inventory {
        inventory_item_id: i64,
    },
}

impl DetailItem {
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

/// One persisted order line
///
/// Wire shape: `{type, status, quantity, request?, menu_item_id | inventory_item_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub item: DetailItem,
    #[serde(default)]
    pub status: LineStatus,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl OrderDetail {
    /// A fresh single-unit line as created at submission time
    pub fn pending(item: DetailItem) -> Self {
        Self {
            item,
            status: LineStatus::Pending,
            quantity: 1,
        }
    }
}

/// Create order payload (POST body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub table_id: i64,
    pub status: OrderStatus,
    /// Snapshot of the cart total at submission time
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// JSON array text of [`OrderDetail`] records
    pub order_details: String,
}

impl NewOrder {
    /// Build a pending order, serializing the detail records to text
    pub fn pending(
        table_id: i64,
        total_amount: f64,
        details: &[OrderDetail],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            table_id,
            status: OrderStatus::Pending,
            total_amount,
            created_at: Utc::now(),
            completed_at: None,
            order_details: serde_json::to_string(details)?,
        })
    }
}

/// Order row as returned by the order API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Either a JSON array or JSON text encoding that array
    #[serde(default)]
    pub order_details: Value,
}

/// Canonical in-memory order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub table_id: Option<i64>,
    pub status: OrderStatus,
    /// Persisted total; authoritative for display of this order
    pub total_amount: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub details: Vec<OrderDetail>,
}

/// Why an order's details payload could not be read
#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("order details text is not valid JSON: {0}")]
    InvalidText(#[source] serde_json::Error),
    #[error("order details have an unexpected shape: {0}")]
    InvalidShape(#[source] serde_json::Error),
    #[error("order details must be an array or JSON text, got {0}")]
    UnexpectedType(&'static str),
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode an `order_details` value in either representation
///
/// Null and blank text mean "no lines". Text is parsed exactly once.
pub fn parse_order_details(raw: &Value) -> Result<Vec<OrderDetail>, DetailsError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Vec::<OrderDetail>::deserialize(raw).map_err(DetailsError::InvalidShape),
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => {
            let decoded: Value = serde_json::from_str(text).map_err(DetailsError::InvalidText)?;
            match decoded {
                Value::Array(_) => {
                    Vec::<OrderDetail>::deserialize(&decoded).map_err(DetailsError::InvalidShape)
                }
                other => Err(DetailsError::UnexpectedType(json_type_name(&other))),
            }
        }
        other => Err(DetailsError::UnexpectedType(json_type_name(other))),
    }
}

impl OrderRecord {
    /// Convert to the canonical order.
    ///
    /// A malformed details payload yields an order with no lines plus the
    /// parse error, so one bad row never poisons a whole history list.
    pub fn normalize(self) -> (Order, Option<DetailsError>) {
        let (details, error) = match parse_order_details(&self.order_details) {
            Ok(details) => (details, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        let order = Order {
            id: self.id,
            table_id: self.table_id,
            status: self.status,
            total_amount: self.total_amount,
            created_at: self.created_at,
            completed_at: self.completed_at,
            details,
        };
        (order, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_details() -> Vec<OrderDetail> {
        vec![
            OrderDetail::pending(DetailItem::Menu {
                menu_item_id: 1,
                request: Some("no onions".into()),
            }),
            OrderDetail::pending(DetailItem::Inventory {
                inventory_item_id: 7,
            }),
        ]
    }

    #[test]
    fn test_detail_wire_shape() {
        let value = serde_json::to_value(sample_details()).unwrap();
        assert_eq!(
            value,
            json!([
                {"type": "menu", "menu_item_id": 1, "request": "no onions", "status": "pending", "quantity": 1},
                {"type": "inventory", "inventory_item_id": 7, "status": "pending", "quantity": 1}
            ])
        );
    }

    #[test]
    fn test_text_and_array_forms_parse_identically() {
        let array = json!([
            {"type": "menu", "menu_item_id": 1, "request": "no onions", "status": "pending", "quantity": 1},
            {"type": "inventory", "inventory_item_id": 7, "status": "completed", "quantity": 1}
        ]);
        let text = Value::String(array.to_string());

        let from_array = parse_order_details(&array).unwrap();
        let from_text = parse_order_details(&text).unwrap();
        assert_eq!(from_array, from_text);
        assert_eq!(from_text[1].status, LineStatus::Completed);
        assert_eq!(from_text[0].item.request(), Some("no onions"));
    }

    #[test]
    fn test_inventory_request_field_is_ignored() {
        let raw = json!([{"type": "inventory", "inventory_item_id": 3, "request": "cold", "status": "pending", "quantity": 1}]);
        let details = parse_order_details(&raw).unwrap();
        assert_eq!(details[0].item, DetailItem::Inventory { inventory_item_id: 3 });
        assert_eq!(details[0].item.request(), None);
    }

    #[test]
    fn test_missing_status_and_quantity_default() {
        let raw = json!([{"type": "menu", "menu_item_id": 4}]);
        let details = parse_order_details(&raw).unwrap();
        assert_eq!(details[0].status, LineStatus::Pending);
        assert_eq!(details[0].quantity, 1);
    }

    #[test]
    fn test_null_and_blank_mean_no_lines() {
        assert!(parse_order_details(&Value::Null).unwrap().is_empty());
        assert!(parse_order_details(&json!("  ")).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_details() {
        assert!(matches!(
            parse_order_details(&json!("[{not json")),
            Err(DetailsError::InvalidText(_))
        ));
        assert!(matches!(
            parse_order_details(&json!([{"type": "dessert", "id": 1}])),
            Err(DetailsError::InvalidShape(_))
        ));
        assert!(matches!(
            parse_order_details(&json!("{\"a\": 1}")),
            Err(DetailsError::UnexpectedType("object"))
        ));
        assert!(matches!(
            parse_order_details(&json!(42)),
            Err(DetailsError::UnexpectedType("number"))
        ));
    }

    #[test]
    fn test_record_normalize_keeps_total_on_malformed_details() {
        let record: OrderRecord = serde_json::from_value(json!({
            "id": 10,
            "table_id": 7,
            "status": "Processing",
            "total_amount": "45.50",
            "order_details": "oops"
        }))
        .unwrap();

        let (order, error) = record.normalize();
        assert!(error.is_some());
        assert!(order.details.is_empty());
        assert_eq!(order.total_amount, 45.5);
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    #[test]
    fn test_record_accepts_naive_timestamps() {
        let record: OrderRecord = serde_json::from_value(json!({
            "id": 11,
            "created_at": "2024-05-01T12:00:00",
            "completed_at": "2024-05-01 12:30:00"
        }))
        .unwrap();

        let created = record.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert_eq!((record.completed_at.unwrap() - created).num_minutes(), 30);
    }

    #[test]
    fn test_new_order_serializes_details_as_text() {
        let order = NewOrder::pending(7, 200.0, &sample_details()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.completed_at.is_none());

        let reparsed = parse_order_details(&Value::String(order.order_details.clone())).unwrap();
        assert_eq!(reparsed, sample_details());
    }
}
