//! Money calculation utilities using rust_decimal for precision
//!
//! Catalog prices travel as `f64`; every sum is done in `Decimal` and
//! converted back, rounded to 2 decimal places, only at the edges.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of f64 amounts without binary drift
pub fn sum_amounts(amounts: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

/// Confirmation-screen breakdown
///
/// `subtotal` is the cart total sent as the order's `total_amount`; VAT is
/// display-only and comes from the configured percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub vat_percentage: f64,
    pub vat: f64,
    pub total: f64,
}

impl PriceBreakdown {
    pub fn new(subtotal: Decimal, vat_percentage: f64) -> Self {
        let subtotal = round(subtotal);
        let vat = round(subtotal * to_decimal(vat_percentage) / Decimal::ONE_HUNDRED);
        Self {
            subtotal: to_f64(subtotal),
            vat_percentage,
            vat: to_f64(vat),
            total: to_f64(subtotal + vat),
        }
    }
}
