//! Fixed-point amount calculator.
//!
//! Pure integer math for resolving the amount an item transfers at a given
//! point of an order's lifetime and for a given fill fraction. Everything runs
//! in checked [`U256`] arithmetic, the same domain the settlement engine
//! validates in, so a product that would revert on chain is reported as
//! [`DomainError::AmountOverflow`] instead of wrapping.
//!
//! Rounding is directional: amounts the fulfiller pays (consideration) round
//! up, amounts the fulfiller receives (offer) round down. The fulfiller never
//! receives more than its proportional share and never pays less, which is
//! the direction the settlement engine's own division enforces.
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use fillwright::domain::{compute_amount, FillFraction, Progress, Rounding};
//!
//! let fraction = FillFraction::new(U256::from(1), U256::from(3)).unwrap();
//! let paid = compute_amount(U256::from(10), U256::from(10), Progress::fixed(), &fraction, Rounding::Up).unwrap();
//! let received = compute_amount(U256::from(10), U256::from(10), Progress::fixed(), &fraction, Rounding::Down).unwrap();
//!
//! assert_eq!(paid, U256::from(4));
//! assert_eq!(received, U256::from(3));
//! ```

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::error::DomainError;
use super::fraction::FillFraction;

/// Denominator for fee basis points.
pub const BASIS_POINTS_DIVISOR: u64 = 10_000;

/// Direction of integer rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round towards positive infinity (amounts the fulfiller pays).
    Up,
    /// Round towards zero (amounts the fulfiller receives).
    Down,
}

/// Position inside an order's active window.
///
/// `elapsed / duration` drives linear interpolation between an item's start
/// and end amounts. A zero duration means the amounts are static.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: U256,
    pub duration: U256,
}

impl Progress {
    /// Progress for orders whose amounts never change.
    #[must_use]
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Progress of `elapsed` seconds into a window of `duration` seconds.
    ///
    /// `elapsed` is clamped to `duration`.
    #[must_use]
    pub fn new(elapsed: u64, duration: u64) -> Self {
        Self {
            elapsed: U256::from(elapsed.min(duration)),
            duration: U256::from(duration),
        }
    }
}

/// Resolve an item's amount for a point in time and a fill fraction.
///
/// The time step interpolates linearly between `start` and `end` (skipped for
/// static amounts or a zero-length window), then the fill step scales the
/// result by the fraction. A full fraction returns the time-adjusted amount
/// untouched, so full fills reproduce the original amounts exactly.
///
/// # Errors
///
/// Returns [`DomainError::AmountOverflow`] if an intermediate product does not
/// fit in 256 bits.
pub fn compute_amount(
    start: U256,
    end: U256,
    progress: Progress,
    fraction: &FillFraction,
    rounding: Rounding,
) -> Result<U256, DomainError> {
    let time_adjusted = interpolate(start, end, progress, rounding)?;
    if fraction.is_full() {
        return Ok(time_adjusted);
    }
    mul_div(
        time_adjusted,
        fraction.numerator(),
        fraction.denominator(),
        rounding,
        "fill amount",
    )
}

/// Fee slice of `base` for the given basis points.
///
/// `base` is expected to be the already fill-scaled amount.
///
/// # Errors
///
/// Returns [`DomainError::AmountOverflow`] if `base × basis_points` overflows.
pub fn fee_amount(base: U256, basis_points: u16, rounding: Rounding) -> Result<U256, DomainError> {
    mul_div(
        base,
        U256::from(basis_points),
        U256::from(BASIS_POINTS_DIVISOR),
        rounding,
        "fee amount",
    )
}

/// Scale a decimal literal to integer base units.
///
/// `3.1415926535897` with 18 decimals becomes `3141592653589700000`. The
/// conversion is exact; literals that would need truncation are rejected.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] for negative amounts or literals with
/// more fractional digits than `decimals`, and [`DomainError::AmountOverflow`]
/// when the scaled value does not fit in 256 bits.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, DomainError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::InvalidAmount {
            amount: amount.to_string(),
            reason: "amount is negative".to_string(),
        });
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(DomainError::InvalidAmount {
            amount: amount.to_string(),
            reason: format!("more than {decimals} fractional digits"),
        });
    }

    let mantissa =
        u128::try_from(normalized.mantissa()).map_err(|e| DomainError::InvalidAmount {
            amount: amount.to_string(),
            reason: e.to_string(),
        })?;
    let factor = U256::from(10u8)
        .checked_pow(U256::from(decimals - scale))
        .ok_or(DomainError::AmountOverflow {
            context: "decimal scaling",
        })?;

    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(DomainError::AmountOverflow {
            context: "decimal scaling",
        })
}

/// Parse a decimal literal string and scale it to base units.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] if the literal is not a decimal
/// number, otherwise the errors of [`to_base_units`].
pub fn parse_base_units(literal: &str, decimals: u32) -> Result<U256, DomainError> {
    let amount = Decimal::from_str(literal.trim()).map_err(|e| DomainError::InvalidAmount {
        amount: literal.to_string(),
        reason: e.to_string(),
    })?;
    to_base_units(amount, decimals)
}

/// `value × numerator / denominator` with directional rounding.
pub(crate) fn mul_div(
    value: U256,
    numerator: U256,
    denominator: U256,
    rounding: Rounding,
    context: &'static str,
) -> Result<U256, DomainError> {
    let product = value
        .checked_mul(numerator)
        .ok_or(DomainError::AmountOverflow { context })?;
    div_rounded(product, denominator, rounding, context)
}

fn div_rounded(
    value: U256,
    divisor: U256,
    rounding: Rounding,
    context: &'static str,
) -> Result<U256, DomainError> {
    if divisor.is_zero() {
        return Err(DomainError::AmountOverflow { context });
    }
    let quotient = value / divisor;
    let remainder = value % divisor;
    match rounding {
        Rounding::Up if !remainder.is_zero() => Ok(quotient + U256::from(1u8)),
        _ => Ok(quotient),
    }
}

/// Linear interpolation as `(start × remaining + end × elapsed) / duration`.
///
/// Weighting both bounds keeps increasing and decreasing curves in unsigned
/// arithmetic.
fn interpolate(
    start: U256,
    end: U256,
    progress: Progress,
    rounding: Rounding,
) -> Result<U256, DomainError> {
    if start == end || progress.duration.is_zero() {
        return Ok(start);
    }

    let elapsed = progress.elapsed.min(progress.duration);
    let remaining = progress.duration - elapsed;
    let overflow = DomainError::AmountOverflow {
        context: "time interpolation",
    };

    let weighted_start = start.checked_mul(remaining).ok_or(overflow.clone())?;
    let weighted_end = end.checked_mul(elapsed).ok_or(overflow.clone())?;
    let total = weighted_start.checked_add(weighted_end).ok_or(overflow)?;

    div_rounded(total, progress.duration, rounding, "time interpolation")
}
