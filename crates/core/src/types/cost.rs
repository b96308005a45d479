//! Monetary cost of a maintenance task.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cost`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    #[error("cost must be a number")]
    NotANumber,
    #[error("cost cannot be negative")]
    Negative,
    #[error("cost cannot exceed $1,000,000,000")]
    TooLarge,
}

/// A non-negative cost in dollars.
///
/// Stored as a `Decimal` so totals never pick up float rounding noise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cost(Decimal);

/// Largest amount accepted from input, in dollars.
const MAX_DOLLARS: u32 = 1_000_000_000;

impl Cost {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Whole-dollar cost.
    #[must_use]
    pub fn dollars(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }

    /// Wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`CostError::Negative`] for amounts below zero and
    /// [`CostError::TooLarge`] above one billion dollars.
    pub fn new(amount: Decimal) -> Result<Self, CostError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CostError::Negative);
        }
        if amount > Decimal::from(MAX_DOLLARS) {
            return Err(CostError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a form field. Blank input means zero.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is not a decimal number or is negative.
    pub fn parse_form(input: &str) -> Result<Self, CostError> {
        let input = input.trim().trim_start_matches('$');
        if input.is_empty() {
            return Ok(Self::ZERO);
        }
        let amount = Decimal::from_str(input).map_err(|_| CostError::NotANumber)?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        if rounded.fract().is_zero() {
            write!(f, "${}", rounded.trunc())
        } else {
            write!(f, "${rounded:.2}")
        }
    }
}

/// Saturates at `Decimal::MAX`. Stored values skip the input cap, so totals
/// must not overflow.
impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Cost {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Cost::dollars(150).to_string(), "$150");
        assert_eq!(Cost::ZERO.to_string(), "$0");
        assert_eq!(Cost::parse_form("12.5").unwrap().to_string(), "$12.50");
        assert_eq!(Cost::parse_form("9.999").unwrap().to_string(), "$10");
    }

    #[test]
    fn test_parse_form() {
        assert_eq!(Cost::parse_form("").unwrap(), Cost::ZERO);
        assert_eq!(Cost::parse_form(" $25 ").unwrap(), Cost::dollars(25));
        assert_eq!(Cost::parse_form("lots"), Err(CostError::NotANumber));
        assert_eq!(Cost::parse_form("-3"), Err(CostError::Negative));
        assert_eq!(Cost::parse_form("1000000000").unwrap(), Cost::dollars(1_000_000_000));
        assert_eq!(
            Cost::parse_form("79228162514264337593543950335"),
            Err(CostError::TooLarge)
        );
    }

    #[test]
    fn test_sum() {
        let costs = [Cost::dollars(25), Cost::dollars(150), Cost::ZERO];
        assert_eq!(costs.iter().sum::<Cost>(), Cost::dollars(175));
    }

    #[test]
    fn test_sum_saturates_on_huge_stored_costs() {
        // Bypasses the input cap the way a hand-edited data file would.
        let huge: Cost = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        let total: Cost = [huge, huge, Cost::dollars(5)].iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }
}
