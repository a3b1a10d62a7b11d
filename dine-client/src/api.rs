//! Typed order/catalog API
//!
//! The five calls the ordering flow makes against the external service.
//! Responses are accepted bare or inside the [`ApiResponse`] envelope.

use crate::http::HttpClient;
use crate::{ClientError, ClientResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::ApiResponse;
use shared::models::{CatalogPayload, Category, NewOrder, OrderRecord, TableLookup};

const TABLE_LOOKUP_PATH: &str = "/api/tables/lookup";
const CATALOG_PATH: &str = "/api/catalog";
const CATEGORIES_PATH: &str = "/api/categories";
const ORDERS_PATH: &str = "/api/orders";

/// Only used to borrow `Url`'s query encoder; never requested
const QUERY_BASE: &str = "http://query.invalid";

/// Order/catalog API bound to a transport
#[derive(Debug, Clone)]
pub struct OrderApi<C> {
    http: C,
}

impl<C: HttpClient> OrderApi<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    /// `GET /api/tables/lookup?token=…`
    pub async fn lookup_table(&self, token: &str) -> ClientResult<Vec<TableLookup>> {
        let path = with_token_query(TABLE_LOOKUP_PATH, token)?;
        let raw: Value = self.http.get(&path, None).await?;
        unwrap_envelope(raw)
    }

    /// `GET /api/catalog`
    pub async fn fetch_catalog(&self) -> ClientResult<CatalogPayload> {
        let raw: Value = self.http.get(CATALOG_PATH, None).await?;
        unwrap_envelope(raw)
    }

    /// `GET /api/categories`
    pub async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        let raw: Value = self.http.get(CATEGORIES_PATH, None).await?;
        unwrap_envelope(raw)
    }

    /// `POST /api/orders` with the session token in the correlation header
    ///
    /// The API answers with the created row, or an array holding it.
    pub async fn create_order(&self, order: &NewOrder, token: &str) -> ClientResult<OrderRecord> {
        let raw: Value = self.http.post(ORDERS_PATH, order, Some(token)).await?;
        match unwrap_envelope::<OneOrMany<OrderRecord>>(raw)? {
            OneOrMany::One(record) => Ok(record),
            OneOrMany::Many(records) => records.into_iter().next().ok_or_else(|| {
                ClientError::InvalidResponse("create order returned no record".into())
            }),
        }
    }

    /// `GET /api/orders?token=…` with the session token in the correlation header
    ///
    /// Rows come back undecoded so one unreadable row cannot fail the list.
    pub async fn fetch_orders(&self, token: &str) -> ClientResult<Vec<Value>> {
        let path = with_token_query(ORDERS_PATH, token)?;
        let raw: Value = self.http.get(&path, Some(token)).await?;
        unwrap_envelope(raw)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn with_token_query(path: &str, token: &str) -> ClientResult<String> {
    let mut url = reqwest::Url::parse(QUERY_BASE)
        .map_err(|e| ClientError::Internal(format!("Invalid query base: {}", e)))?;
    url.set_path(path);
    url.query_pairs_mut().append_pair("token", token);
    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

fn is_envelope(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.contains_key("code") && (map.contains_key("data") || map.contains_key("message"))
        }
        _ => false,
    }
}

/// Strip the `ApiResponse` envelope if present, then decode `T`
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(raw: Value) -> ClientResult<T> {
    let body = if is_envelope(&raw) {
        let envelope: ApiResponse<Value> = serde_json::from_value(raw)?;
        if !envelope.is_success() {
            return Err(ClientError::Api {
                code: envelope.code.unwrap_or_default(),
                message: envelope.message,
                details: envelope
                    .details
                    .map(|d| Value::Object(d.into_iter().collect())),
            });
        }
        envelope.data.unwrap_or(Value::Null)
    } else {
        raw
    };
    serde_json::from_value(body)
        .map_err(|e| ClientError::InvalidResponse(format!("Unexpected payload: {}", e)))
}
