//! Dining Table Model

use serde::{Deserialize, Serialize};

/// One row of the table-by-token lookup.
///
/// The lookup endpoint returns an array; a valid session token yields
/// exactly one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLookup {
    #[serde(alias = "id")]
    pub table_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
