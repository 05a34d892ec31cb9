//! Tolerance-aware helpers for monetary amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every comparison against the balancing tolerance goes through these
//! helpers so the 0.01 minor-unit rule lives in one place.

use rust_decimal::Decimal;

/// Absolute tolerance for balance checks (one currency minor unit).
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Returns true if `|amount| <= TOLERANCE`.
///
/// Used for zero-balance suppression, where a row at exactly one
/// minor unit still counts as zero.
#[must_use]
pub fn is_negligible(amount: Decimal) -> bool {
    amount.abs() <= TOLERANCE
}

/// Returns true if `|a - b| < TOLERANCE`.
///
/// This is the accounting-equation check: a difference of exactly one
/// minor unit is already out of balance.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < TOLERANCE
}

/// Returns true if `|difference| > TOLERANCE`.
///
/// Used to flag unbalanced transaction groups.
#[must_use]
pub fn exceeds_tolerance(difference: Decimal) -> bool {
    difference.abs() > TOLERANCE
}
