//! Client error types
//!
//! [`ClientError`] is the transport taxonomy; [`DineError`] is what the
//! ordering flow surfaces, each variant carrying a defined degraded state
//! for the UI via [`DineError::user_message`].

use crate::stock::StockShortfall;
use shared::models::{DetailsError, ItemRef};
use shared::{AppError, ErrorCode};
use std::time::Duration;
use thiserror::Error;

/// Transport error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Structured error returned by the API
    #[error("API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Request did not complete within the bounded wait
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Structured error code, when the server sent one
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }
}

/// Result type for transport operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Rejection of a single cart add
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("{0} is not in the catalog")]
    UnknownItem(ItemRef),

    #[error("only {available} of {name} available, {requested} requested")]
    InsufficientStock {
        item: ItemRef,
        name: String,
        requested: usize,
        available: i64,
    },
}

impl CartError {
    /// Warning text shown next to the add button
    pub fn user_message(&self) -> String {
        match self {
            Self::ZeroQuantity => "Choose at least one.".to_string(),
            Self::UnknownItem(_) => "This item is no longer available.".to_string(),
            Self::InsufficientStock {
                name, available, ..
            } => match available {
                0 => format!("{} is sold out.", name),
                n => format!("Only {} more {} can be added.", n, name),
            },
        }
    }
}

/// Errors surfaced by the ordering flow
#[derive(Debug, Error)]
pub enum DineError {
    /// Token missing, unresolvable, or the session already ended
    #[error("session invalid: {reason}")]
    SessionInvalid { reason: String },

    /// Catalog fetch failed
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ClientError),

    /// Cart inventory lines exceed current stock
    #[error("{} item(s) exceed available stock", .0.len())]
    StockConflict(Vec<StockShortfall>),

    /// Nothing to submit
    #[error("cannot submit an empty order")]
    EmptyCart,

    /// Order POST failed; cart preserved
    #[error("order submission failed: {0}")]
    SubmissionFailed(#[source] ClientError),

    /// Another submission of this session is still in flight
    #[error("an order submission is already in progress")]
    SubmissionInProgress,

    /// A history row could not be decoded at all and was left out
    #[error("order row is unreadable: {source}")]
    MalformedOrder {
        order_id: Option<i64>,
        #[source]
        source: serde_json::Error,
    },

    /// One order's details could not be decoded
    #[error("order {order_id} has malformed details: {source}")]
    MalformedOrderDetails {
        order_id: i64,
        #[source]
        source: DetailsError,
    },

    /// Order history fetch failed
    #[error("order history unavailable: {0}")]
    HistoryUnavailable(#[source] ClientError),
}

impl DineError {
    pub fn session_invalid(reason: impl Into<String>) -> Self {
        Self::SessionInvalid {
            reason: reason.into(),
        }
    }

    /// Map onto the shared error code table
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::SessionInvalid { .. } => ErrorCode::SessionExpired,
            Self::CatalogUnavailable(_) => ErrorCode::CatalogUnavailable,
            Self::StockConflict(_) => ErrorCode::ProductOutOfStock,
            Self::EmptyCart => ErrorCode::OrderEmpty,
            Self::SubmissionFailed(ClientError::Timeout(_)) => ErrorCode::TimeoutError,
            Self::SubmissionFailed(_) => ErrorCode::OrderSubmitFailed,
            Self::SubmissionInProgress => ErrorCode::OrderInProgress,
            Self::MalformedOrderDetails { .. } | Self::MalformedOrder { .. } => {
                ErrorCode::OrderDetailsMalformed
            }
            Self::HistoryUnavailable(_) => ErrorCode::NetworkError,
        }
    }

    /// Whether the user can usefully press "retry"
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SubmissionFailed(_) | Self::CatalogUnavailable(_) | Self::HistoryUnavailable(_)
        )
    }

    /// Text for the degraded UI state of this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionInvalid { .. } => {
                "Your table session has ended. Thanks for visiting! Scan the table code to order again."
                    .to_string()
            }
            Self::CatalogUnavailable(_) => "The menu is not available right now.".to_string(),
            Self::StockConflict(items) => {
                let list = items
                    .iter()
                    .map(|s| format!("{} ({} available)", s.name, s.available))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Please reduce these items before ordering: {}", list)
            }
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::SubmissionFailed(_) => {
                "We couldn't send your order. Your cart is saved, please try again.".to_string()
            }
            Self::SubmissionInProgress => "Your order is already being sent.".to_string(),
            Self::MalformedOrderDetails { .. } => {
                "Some details of this order can't be shown.".to_string()
            }
            Self::MalformedOrder { .. } => "An earlier order can't be shown.".to_string(),
            Self::HistoryUnavailable(_) => "Your previous orders can't be loaded.".to_string(),
        }
    }
}

impl From<&DineError> for AppError {
    fn from(err: &DineError) -> Self {
        let app = AppError::with_message(err.error_code(), err.user_message());
        match err {
            DineError::StockConflict(items) => items.iter().fold(app, |app, s| {
                app.with_detail(s.item.to_string(), s.available)
            }),
            _ => app,
        }
    }
}

/// Result type for ordering-flow operations
pub type DineResult<T> = Result<T, DineError>;
