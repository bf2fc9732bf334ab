//! Fill fractions.

use std::fmt;

use alloy_primitives::U256;

use super::error::DomainError;

/// Share of an order being filled: `units_to_fill / total_units`.
///
/// Always satisfies `0 < numerator <= denominator`; the only way to build
/// one is through [`FillFraction::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillFraction {
    numerator: U256,
    denominator: U256,
}

impl FillFraction {
    /// Create a fraction, rejecting zero, improper, and undefined fractions.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFraction`] when the denominator is zero,
    /// the numerator is zero, or the numerator exceeds the denominator.
    pub fn new(numerator: U256, denominator: U256) -> Result<Self, DomainError> {
        if denominator.is_zero() || numerator.is_zero() || numerator > denominator {
            return Err(DomainError::InvalidFraction {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// The whole order.
    #[must_use]
    pub fn full() -> Self {
        Self {
            numerator: U256::from(1u8),
            denominator: U256::from(1u8),
        }
    }

    #[must_use]
    pub const fn numerator(&self) -> U256 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(&self) -> U256 {
        self.denominator
    }

    /// True when the fraction covers the whole order.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.numerator == self.denominator
    }

    /// True when `amount × numerator / denominator` has no remainder.
    #[must_use]
    pub fn scales_exactly(&self, amount: U256) -> bool {
        self.is_full() || amount.mul_mod(self.numerator, self.denominator).is_zero()
    }

    /// Same fraction in lowest terms.
    #[must_use]
    pub fn reduced(&self) -> Self {
        let divisor = gcd(self.numerator, self.denominator);
        Self {
            numerator: self.numerator / divisor,
            denominator: self.denominator / divisor,
        }
    }
}

impl fmt::Display for FillFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn gcd(mut a: U256, mut b: U256) -> U256 {
    while !b.is_zero() {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}
