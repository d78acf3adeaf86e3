use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Flat sales tax applied to every invoice, in basis points.
pub const TAX_RATE_BPS: i64 = 800;

/// An amount of money in whole cents.
///
/// Arithmetic saturates at the `i64` bounds instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Tax owed on this amount at [`TAX_RATE_BPS`], rounded half away from zero.
    pub fn tax(self) -> Money {
        let scaled = self.0.saturating_mul(TAX_RATE_BPS);
        let rounded = if scaled >= 0 {
            scaled.saturating_add(5_000) / 10_000
        } else {
            scaled.saturating_sub(5_000) / 10_000
        };
        Money(rounded)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_eight_percent_in_cents() {
        assert_eq!(Money::from_dollars(89).tax(), Money::from_cents(712));
        assert_eq!(Money::from_dollars(1600).tax(), Money::from_dollars(128));
        // 8% of $0.06 is 0.48 cents
        assert_eq!(Money::from_cents(6).tax(), Money::ZERO);
        assert_eq!(Money::from_cents(7).tax(), Money::from_cents(1));
    }

    #[test]
    fn displays_as_dollars() {
        assert_eq!(Money::from_cents(9612).to_string(), "$96.12");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn huge_amounts_saturate() {
        let huge = Money::from_cents(i64::MAX / 1000);
        assert_eq!(huge * u32::MAX, Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MAX) + Money::from_cents(1), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) + Money::from_cents(-1), Money::from_cents(i64::MIN));
        assert_eq!(Money::from_cents(i64::MAX).tax(), Money::from_cents(i64::MAX / 10_000));
    }
}
