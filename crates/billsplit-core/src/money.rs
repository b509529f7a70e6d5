//! # Money Module
//!
//! Provides the `Money` type for prices read off a receipt.
//!
//! ## Where Integers Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unit prices and line totals are exact: integer cents.                 │
//! │                                                                         │
//! │    "3.49" ──parse──► Money(349) ──× qty──► Money(698)                   │
//! │                                                                         │
//! │  Shares are not: a 4-pack split 1 / 1.5 / 1.5, or a $10.00 item        │
//! │  split three ways, has no exact cent representation. Shares are       │
//! │  therefore f64 currency units and only get rounded back to cents       │
//! │  when they are displayed or exported.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billsplit_core::money::Money;
//!
//! let price: Money = "3.49".parse().unwrap();
//! assert_eq!(price.cents(), 349);
//! assert_eq!(price.multiply_quantity(2).to_string(), "$6.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: parsing accepts negatives so validation can reject
///   them with a proper error instead of a parse failure
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a derived currency amount (e.g. a participant's share) to the
    /// nearest cent.
    ///
    /// Prices never go through here; they are parsed from decimal text.
    pub fn round_from_major(amount: f64) -> Self {
        let cents = (amount * 100.0).round();
        if cents == 0.0 {
            // Keeps -0.004 from rendering as "-$0.00"
            return Money::zero();
        }
        Money(cents as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in currency units as a float, for share math.
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// Validated prices and quantities never get near them
    /// (see [`crate::validation::validate_price`]).
    ///
    /// ## Example
    /// ```rust
    /// use billsplit_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats with an arbitrary currency symbol: `-` sign first, then the
    /// symbol, then exactly two decimals.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Formats a derived amount the way exports and tables show it:
/// rounded to the cent, `$` prefix, two decimals.
///
/// ```rust
/// use billsplit_core::money::format_amount;
///
/// assert_eq!(format_amount(9.72), "$9.72");
/// assert_eq!(format_amount(1.0 / 3.0), "$0.33");
/// ```
pub fn format_amount(amount: f64) -> String {
    Money::round_from_major(amount).to_string()
}

// =============================================================================
// Parsing
// =============================================================================

impl Money {
    /// Parses decimal text like [`FromStr`], but rounds anything past the
    /// cent half away from zero instead of rejecting it.
    ///
    /// Receipts and exported spreadsheets sometimes carry unit prices such as
    /// `0.333`; typed input goes through `parse` and stays exact.
    ///
    /// ```rust
    /// use billsplit_core::money::Money;
    ///
    /// assert_eq!(Money::parse_rounded("0.335").unwrap().cents(), 34);
    /// assert_eq!(Money::parse_rounded("$2.5").unwrap().cents(), 250);
    /// ```
    pub fn parse_rounded(s: &str) -> Result<Self, ValidationError> {
        parse_decimal(s, true)
    }
}

/// Parses receipt-style decimal text: `3`, `3.5`, `3.49`, `$3.49`, `-1.00`.
///
/// More than two decimal places is rejected rather than silently rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s, false)
    }
}

fn parse_decimal(s: &str, round_extra: bool) -> Result<Money, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: reason.to_string(),
    };

    let trimmed = s.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    if rest.is_empty() {
        return Err(invalid("empty amount"));
    }

    let (major_str, minor_str) = match rest.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (rest, ""),
    };
    if major_str.is_empty() && minor_str.is_empty() {
        return Err(invalid("no digits"));
    }
    if !major_str.chars().all(|c| c.is_ascii_digit())
        || !minor_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("expected digits with an optional decimal point"));
    }

    let (minor_str, round_up) = if minor_str.len() > 2 {
        if !round_extra {
            return Err(invalid("at most two decimal places"));
        }
        (&minor_str[..2], minor_str.as_bytes()[2] >= b'5')
    } else {
        (minor_str, false)
    };

    let major: i64 = if major_str.is_empty() {
        0
    } else {
        major_str.parse().map_err(|_| invalid("amount too large"))?
    };
    let minor: i64 = match minor_str.len() {
        0 => 0,
        1 => minor_str.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
        _ => minor_str.parse().map_err(|_| invalid("bad cents"))?,
    };

    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .and_then(|c| c.checked_add(i64::from(round_up)))
        .ok_or_else(|| invalid("amount too large"))?;
    Ok(Money(if negative { -cents } else { cents }))
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(Money::from_cents(1234).format_with("€"), "€12.34");
    }

    #[test]
    fn test_parse() {
        assert_eq!("3.49".parse::<Money>().unwrap().cents(), 349);
        assert_eq!("$3.49".parse::<Money>().unwrap().cents(), 349);
        assert_eq!("3.5".parse::<Money>().unwrap().cents(), 350);
        assert_eq!("3".parse::<Money>().unwrap().cents(), 300);
        assert_eq!(".99".parse::<Money>().unwrap().cents(), 99);
        assert_eq!(" 12.00 ".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("-1.25".parse::<Money>().unwrap().cents(), -125);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("$".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_round_from_major() {
        assert_eq!(Money::round_from_major(9.72).cents(), 972);
        assert_eq!(Money::round_from_major(1.0 / 3.0).cents(), 33);
        assert_eq!(Money::round_from_major(2.0 / 3.0).cents(), 67);
        assert_eq!(Money::round_from_major(-0.004), Money::zero());
        assert_eq!(format_amount(-0.004), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
        assert!((a.to_major() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let huge: Money = "92233720368547758.07".parse().unwrap();
        assert_eq!(huge.multiply_quantity(2).cents(), i64::MAX);
        assert_eq!((huge + Money::from_cents(1)).cents(), i64::MAX);
    }

    #[test]
    fn test_parse_rounded() {
        assert_eq!(Money::parse_rounded("1.234").unwrap().cents(), 123);
        assert_eq!(Money::parse_rounded("1.235").unwrap().cents(), 124);
        assert_eq!(Money::parse_rounded("0.999").unwrap().cents(), 100);
        assert_eq!(Money::parse_rounded("-1.005").unwrap().cents(), -101);
        assert_eq!(Money::parse_rounded("3.49").unwrap().cents(), 349);
        assert!(Money::parse_rounded("1.2x5").is_err());
        assert!("1.235".parse::<Money>().is_err());
    }
}
