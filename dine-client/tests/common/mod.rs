// dine-client/tests/common/mod.rs
// In-process order/catalog API for integration tests

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dine_client::config::DEFAULT_SESSION_HEADER;
use dine_client::{ClientConfig, DineClient, OneshotHttpClient};
use serde_json::{Value, json};
use shared::AppError;
use shared::models::{DetailItem, parse_order_details};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "abc123";
pub const TABLE_ID: i64 = 7;
pub const SERVICE_TOKEN: &str = "svc-token";

pub const BURGER: i64 = 1;
pub const SOUP: i64 = 2;
pub const COLA: i64 = 2;
pub const WATER: i64 = 3;

/// One captured POST /api/orders
#[derive(Debug, Clone)]
pub struct Posted {
    pub auth: Option<String>,
    pub session: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
pub struct MockApi {
    pub lookups: Arc<AtomicUsize>,
    pub catalog_calls: Arc<AtomicUsize>,
    pub order_posts: Arc<AtomicUsize>,
    pub history_calls: Arc<AtomicUsize>,
    pub cola_stock: Arc<AtomicI64>,
    pub fail_catalog: Arc<AtomicBool>,
    pub fail_orders: Arc<AtomicBool>,
    pub hang_orders: Arc<AtomicBool>,
    pub slow_orders: Arc<AtomicBool>,
    /// Cola stock as checked by POST /api/orders
    pub server_cola_stock: Arc<AtomicI64>,
    pub fail_history: Arc<AtomicBool>,
    pub posted: Arc<Mutex<Vec<Posted>>>,
    /// Rows served by GET /api/orders
    pub stored: Arc<Mutex<Vec<Value>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            lookups: Arc::default(),
            catalog_calls: Arc::default(),
            order_posts: Arc::default(),
            history_calls: Arc::default(),
            cola_stock: Arc::new(AtomicI64::new(5)),
            fail_catalog: Arc::default(),
            fail_orders: Arc::default(),
            hang_orders: Arc::default(),
            slow_orders: Arc::default(),
            server_cola_stock: Arc::new(AtomicI64::new(5)),
            fail_history: Arc::default(),
            posted: Arc::default(),
            stored: Arc::default(),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/tables/lookup", get(lookup_table))
            .route("/api/catalog", get(catalog))
            .route("/api/categories", get(categories))
            .route("/api/orders", get(list_orders).post(create_order))
            .with_state(self.clone())
    }

    pub fn client(&self) -> DineClient<OneshotHttpClient> {
        self.client_with(ClientConfig::new("http://mock.local").with_submit_timeout(5))
    }

    pub fn client_with(&self, config: ClientConfig) -> DineClient<OneshotHttpClient> {
        let http = OneshotHttpClient::new(self.router()).with_service_token(SERVICE_TOKEN);
        DineClient::with_transport(config, http)
    }

    /// Client that presents no service credential
    pub fn anonymous_client(&self) -> DineClient<OneshotHttpClient> {
        DineClient::with_transport(
            ClientConfig::new("http://mock.local").with_submit_timeout(5),
            OneshotHttpClient::new(self.router()),
        )
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn order_posts(&self) -> usize {
        self.order_posts.load(Ordering::SeqCst)
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    pub fn last_post(&self) -> Posted {
        self.posted.lock().unwrap().last().cloned().unwrap()
    }
}

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn colas_in(body: &Value) -> i64 {
    parse_order_details(&body["order_details"])
        .unwrap_or_default()
        .iter()
        .filter(|d| d.item == DetailItem::Inventory { inventory_item_id: COLA })
        .count() as i64
}

async fn lookup_table(
    State(api): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.lookups.fetch_add(1, Ordering::SeqCst);
    match query.get("token").map(String::as_str) {
        Some(TOKEN) => Json(json!([{ "table_id": TABLE_ID, "token": TOKEN }])).into_response(),
        Some("twin") => Json(json!([{ "table_id": 1 }, { "table_id": 2 }])).into_response(),
        Some("down") => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
        Some("gone") => AppError::not_found("table").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn catalog(State(api): State<MockApi>) -> Response {
    api.catalog_calls.fetch_add(1, Ordering::SeqCst);
    if api.fail_catalog.load(Ordering::SeqCst) {
        return AppError::internal("database unavailable").into_response();
    }
    Json(json!({
        "code": 0,
        "message": "OK",
        "data": {
            "menu_items": [
                { "id": BURGER, "name": "Burger", "price": 120.0, "category_id": 1 },
                { "id": SOUP, "name": "Soup", "price": 60.0 }
            ],
            "inventory_items": [
                {
                    "id": COLA, "name": "Cola", "unit_cost": 40.0,
                    "stock": api.cola_stock.load(Ordering::SeqCst), "max_stock": 24, "unit": "can"
                },
                { "id": WATER, "name": "Water", "unit_cost": 15.0, "stock": 3, "max_stock": 24, "unit": "bottle" }
            ]
        }
    }))
    .into_response()
}

async fn categories() -> Json<Value> {
    Json(json!([{ "id": 1, "name": "Mains", "sort_order": 1 }]))
}

async fn create_order(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    api.order_posts.fetch_add(1, Ordering::SeqCst);
    api.posted.lock().unwrap().push(Posted {
        auth: header_value(&headers, header::AUTHORIZATION),
        session: header_value(&headers, DEFAULT_SESSION_HEADER),
        body: body.clone(),
    });

    if header_value(&headers, header::AUTHORIZATION) != Some(format!("Bearer {}", SERVICE_TOKEN)) {
        return AppError::not_authenticated().into_response();
    }
    if api.hang_orders.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
    if api.slow_orders.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if api.fail_orders.load(Ordering::SeqCst) {
        return AppError::internal("database unavailable").into_response();
    }
    let available = api.server_cola_stock.load(Ordering::SeqCst);
    if colas_in(&body) > available {
        return AppError::out_of_stock("Cola", available).into_response();
    }

    let mut stored = api.stored.lock().unwrap();
    let mut record = body;
    record["id"] = json!(100 + stored.len() as i64 + 1);
    // Numeric columns come back as text from this backend
    let total = record["total_amount"].as_f64().unwrap_or_default();
    record["total_amount"] = json!(format!("{:.2}", total));
    stored.push(record.clone());
    Json(json!([record])).into_response()
}

async fn list_orders(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.history_calls.fetch_add(1, Ordering::SeqCst);
    if api.fail_history.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "upstream timeout").into_response();
    }
    let session = header_value(&headers, DEFAULT_SESSION_HEADER);
    if session.as_deref() != Some(TOKEN) || query.get("token").map(String::as_str) != Some(TOKEN) {
        return AppError::session_expired().into_response();
    }
    let rows = api.stored.lock().unwrap().clone();
    Json(Value::Array(rows)).into_response()
}
