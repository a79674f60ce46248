//! Monetary helpers shared by fee computation and settlement.
//!
//! All amounts are `rust_decimal::Decimal`; the cent is the smallest unit
//! and rounding is always half-up at two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use crate::domain::Error;

/// Number of decimal places carried by every stored monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to the cent, half-up.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate that `amount` is strictly positive.
///
/// Returns the amount unchanged so callers can validate inline.
pub fn require_positive(amount: Decimal, field: &str) -> Result<Decimal, Error> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(
            Error::invalid_request(format!("{field} must be greater than zero")).with_details(
                json!({ "field": field, "value": amount.to_string() }),
            ),
        )
    }
}
