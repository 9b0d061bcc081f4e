//! Decimal arithmetic helpers shared by the fiscal engine.
//!
//! Policy: amounts are `rust_decimal::Decimal` end to end. Only line totals
//! are rounded (half-up, 2 decimal places); computed tax values keep their
//! full precision until display/aggregation. Multiplication and division are
//! checked — overflow is a hard [`DomainError::InvalidNumeric`], never a
//! silent zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DomainError, DomainResult};

/// Round to 2 decimal places, half-up (midpoints away from zero).
///
/// Matches how monetary line totals are stored: `12.345` → `12.35`.
pub fn round_half_up_2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `base × rate / 100`, checked.
///
/// `rate` is a percentage (e.g. `18.00` for 18%). The result is NOT rounded.
pub fn percent_of(base: Decimal, rate: Decimal) -> DomainResult<Decimal> {
    base.checked_mul(rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| DomainError::invalid_numeric("percentage computation overflow"))
}
