//! Currency amounts as whole cents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use thiserror::Error;

/// An amount in cents. Arithmetic saturates instead of overflowing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("'{0}' is not an amount")]
    Invalid(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is too large")]
    TooLarge(String),
}

impl Money {
    /// Smallest expense or payment amount (0.01)
    pub const MIN_POSITIVE: Money = Money(1);

    /// Largest expense or payment amount (99999999.99, ten digits)
    pub const MAX_AMOUNT: Money = Money(9_999_999_999);

    /// ```
    /// use upkeep::models::Money;
    /// assert_eq!(Money::from_cents(1050).to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Whether this can be stored as an expense amount or a payment
    pub fn is_valid_amount(&self) -> bool {
        (Self::MIN_POSITIVE..=Self::MAX_AMOUNT).contains(self)
    }

    /// Parse "10", "10.5", "$10.50", ".75" or "-3.20"
    ///
    /// More than two decimal places is an error rather than being rounded.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let text = input.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let digits = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        let well_formed = !(whole.is_empty() && frac.is_empty())
            && whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(MoneyParseError::Invalid(text.to_string()));
        }
        if frac.len() > 2 {
            return Err(MoneyParseError::TooPrecise(text.to_string()));
        }

        let too_large = || MoneyParseError::TooLarge(text.to_string());
        let units: i64 = match whole {
            "" => 0,
            w => w.parse().map_err(|_| too_large())?,
        };
        let frac_cents: i64 = match frac {
            "" => 0,
            f => format!("{:0<2}", f).parse().map_err(|_| too_large())?,
        };
        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(too_large)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Symbol-prefixed form, e.g. "$1050.00" or "-€3.20"
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }

    /// Plain decimal form used in exports, e.g. "100.00"
    pub fn to_decimal_string(&self) -> String {
        self.format_with_symbol("")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}
