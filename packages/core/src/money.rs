// ABOUTME: Money represented as integer minor currency units
// ABOUTME: Avoids floating point drift in bid totals and fee splits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// An amount of money in minor currency units (cents).
///
/// All bid amounts, fees, and payouts are carried as cents so that sums and
/// proportional splits stay exact. Display formatting converts back to the
/// major unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn new(value: i64) -> Self {
        Cents(value)
    }

    /// Construct from a major-unit amount, e.g. `from_major(12, 50)` = $12.50.
    pub fn from_major(units: i64, cents: i64) -> Self {
        Cents(units * 100 + cents)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a ratio `numerator / denominator`, rounding half up.
    ///
    /// Used for percentage payouts and proportional fee shares. Panics on a
    /// zero denominator, which callers guard against.
    pub fn mul_ratio(self, numerator: i64, denominator: i64) -> Cents {
        debug_assert!(denominator > 0);
        let product = self.0 as i128 * numerator as i128;
        let denominator = denominator as i128;
        let rounded = (product + denominator / 2) / denominator;
        Cents(rounded as i64)
    }

    /// Percentage of this amount, where the percentage carries two decimal
    /// places (e.g. 33.34% -> `percent_hundredths` = 3334).
    pub fn percent_hundredths(self, percent_hundredths: i64) -> Cents {
        self.mul_ratio(percent_hundredths, 10_000)
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        Cents(iter.map(|c| c.0).sum())
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_major() {
        assert_eq!(Cents::from_major(12, 50), Cents(1250));
        assert_eq!(Cents::from_major(0, 30), Cents(30));
    }

    #[test]
    fn test_mul_ratio_rounds_half_up() {
        // 10.00 * 1/3 = 3.33 (333.33.. rounds down)
        assert_eq!(Cents(1000).mul_ratio(1, 3), Cents(333));
        // 10.01 * 1/2 = 5.005 rounds to 5.01
        assert_eq!(Cents(1001).mul_ratio(1, 2), Cents(501));
    }

    #[test]
    fn test_percent_hundredths() {
        // 50% of 1000.00
        assert_eq!(Cents(100_000).percent_hundredths(5000), Cents(50_000));
        // 33.34% of 100.00 = 33.34
        assert_eq!(Cents(10_000).percent_hundredths(3334), Cents(3334));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cents(2930).to_string(), "29.30");
        assert_eq!(Cents(5).to_string(), "0.05");
        assert_eq!(Cents(-1250).to_string(), "-12.50");
    }
}
