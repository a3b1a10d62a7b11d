//! Shared types for the Dine ordering stack
//!
//! Wire models exchanged with the order/catalog API, the numeric error
//! system with its response envelope, and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
