//! Amount type for whole-won spending values typed in by the user.
//!
//! This module provides the `Amount` type which wraps a `u64` and handles parsing user input that
//! may contain commas, a currency sign or other stray characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The largest amount that can be recorded. Thirteen digits keeps every value exactly
/// representable as a JSON number when the ledger is read by other tools.
pub const MAX_AMOUNT: u64 = 9_999_999_999_999;

/// Represents a non-negative amount of money in whole currency units (KRW).
///
/// # Examples
///
/// Parsing strips everything that is not a digit:
/// ```
/// # use daydash::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₩60,000").unwrap();
/// assert_eq!(amount.value(), 60000);
/// assert_eq!(amount.to_string(), "60,000");
/// ```
///
/// Input without any digits is not an amount:
/// ```
/// # use daydash::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("abc").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new `Amount`, rejecting values above `MAX_AMOUNT`.
    pub fn new(value: u64) -> Result<Self, AmountError> {
        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the underlying integer value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, saturating instead of overflowing. Sums are not bounded by `MAX_AMOUNT`.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

/// An error that can occur when parsing user input into an `Amount`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AmountError {
    #[error("'{0}' does not contain any digits")]
    Empty(String),
    #[error("the amount {0} is larger than the maximum of {max}", max = MAX_AMOUNT)]
    TooLarge(String),
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(AmountError::Empty(s.to_string()));
        }

        // Leading zeros do not count against the digit limit.
        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_AMOUNT.to_string().len() {
            return Err(AmountError::TooLarge(digits));
        }

        let value = if significant.is_empty() {
            0
        } else {
            significant
                .parse::<u64>()
                .map_err(|_| AmountError::TooLarge(digits.clone()))?
        };
        Amount::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Exact for values below 2^53.
        write!(f, "{}", format_num::format_num!(",.0", self.0 as f64))
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl TryFrom<u64> for Amount {
    type Error = AmountError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}
