//! Money value object backed by exact decimal arithmetic.
//!
//! Financial amounts are never represented as floats. All balance
//! arithmetic in the crate goes through this type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use super::ValidationError;

/// Exact decimal monetary amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a money value from a decimal without sign restrictions.
    ///
    /// Differences (e.g. price deltas) may legitimately be negative;
    /// use [`Money::non_negative`] or [`Money::positive`] at input
    /// boundaries.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates a money value that must be zero or greater.
    pub fn non_negative(amount: Decimal, field: &str) -> Result<Self, ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::negative(field, amount));
        }
        Ok(Self(amount))
    }

    /// Creates a money value that must be strictly greater than zero.
    pub fn positive(amount: Decimal, field: &str) -> Result<Self, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::not_positive(field, amount));
        }
        Ok(Self(amount))
    }

    /// Convenience constructor from integer units (mostly for tests).
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Returns the inner decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Saturating subtraction clamped at zero.
    pub fn saturating_sub(&self, other: Money) -> Money {
        let diff = self.0 - other.0;
        if diff < Decimal::ZERO {
            Money::ZERO
        } else {
            Money(diff)
        }
    }

    /// Multiplies by a percentage expressed as a decimal rate (0.10 = 10%).
    pub fn percentage(&self, rate: Decimal) -> Money {
        Money(self.0 * rate)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn non_negative_rejects_negative_amounts() {
        assert!(Money::non_negative(dec("-0.01"), "total_amount").is_err());
        assert!(Money::non_negative(dec("0"), "total_amount").is_ok());
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(Money::positive(dec("0"), "amount").is_err());
        assert!(Money::positive(dec("-1"), "amount").is_err());
        assert!(Money::positive(dec("0.01"), "amount").is_ok());
    }

    #[test]
    fn sum_adds_exactly() {
        let total: Money = ["0.1", "0.2", "0.3"]
            .into_iter()
            .map(|s| Money::new(dec(s)))
            .sum();
        assert_eq!(total, Money::new(dec("0.6")));
    }

    #[test]
    fn saturating_sub_clamps_at_zero() {
        let a = Money::from_units(100);
        let b = Money::from_units(150);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_units(50));
    }

    #[test]
    fn percentage_computes_commission() {
        let revenue = Money::from_units(1000);
        assert_eq!(revenue.percentage(dec("0.10")), Money::from_units(100));
    }

    proptest::proptest! {
        #[test]
        fn saturating_sub_never_goes_negative(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let diff = Money::from_units(a).saturating_sub(Money::from_units(b));
            proptest::prop_assert!(!diff.is_negative());
        }

        #[test]
        fn add_then_sub_round_trips(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let a = Money::from_units(a);
            let b = Money::from_units(b);
            proptest::prop_assert_eq!(a + b - b, a);
        }
    }
}
