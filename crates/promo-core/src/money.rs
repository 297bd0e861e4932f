//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Money, Decimal In Between
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH REPRESENTATION LIVES                                        │
//! │                                                                         │
//! │  CartItem.unit_price ──► Money (cents, i64)                             │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  free units × price,  subtotal × rate / 100                             │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  unrounded amount ─────► Decimal (major units, e.g. 20.0)               │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  RoundingPolicy::round ─► Money again                                   │
//! │                                                                         │
//! │  Floats never appear. Decimal only exists until the amount is rounded. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use promo_core::money::Money;
//!
//! let price = Money::from_cents(200); // $2.00
//! let free_value = price.multiply_quantity(2);
//! assert_eq!(free_value.cents(), 400);
//! assert_eq!(free_value.to_string(), "$4.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Number of decimal places held by one minor unit.
pub const MINOR_UNIT_DECIMALS: u32 = 2;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discount line items carry negative prices
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Ord**: Candidate amounts are compared directly when choosing a discount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_UNITS_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_UNITS_PER_MAJOR + minor)
        }
    }

    /// Converts an exact decimal amount in major units into Money.
    ///
    /// Fails when the amount has more precision than one minor unit or does
    /// not fit into an i64 count of cents. Rounding is never done here; that
    /// is the job of a [`RoundingPolicy`](crate::rounding::RoundingPolicy).
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Money::from_decimal(Decimal::new(2000, 2)).unwrap(); // 20.00
    /// assert_eq!(amount.cents(), 2000);
    ///
    /// assert!(Money::from_decimal(Decimal::new(1, 3)).is_err()); // 0.001
    /// ```
    pub fn from_decimal(amount: Decimal) -> CoreResult<Self> {
        let out_of_range = || CoreError::MoneyOutOfRange {
            value: amount.to_string(),
        };

        let scaled = amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or_else(out_of_range)?;

        if !scaled.fract().is_zero() {
            return Err(out_of_range());
        }

        scaled.to_i64().map(Money).ok_or_else(out_of_range)
    }

    /// Returns the value as an exact decimal in major units.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::from_cents(1099).to_decimal(), Decimal::new(1099, 2));
    /// ```
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_DECIMALS)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / MINOR_UNITS_PER_MAJOR
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % MINOR_UNITS_PER_MAJOR).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Addition returning `None` on i64 overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplication by a quantity returning `None` on i64 overflow.
    ///
    /// ## Example
    /// ```rust
    /// use promo_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(250).checked_mul(4), Some(Money::from_cents(1000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, failing with [`CoreError::MoneyOutOfRange`] on overflow.
    pub fn try_sum<I>(amounts: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts.into_iter().try_fold(Money::zero(), |acc, amount| {
            acc.checked_add(amount).ok_or_else(|| CoreError::MoneyOutOfRange {
                value: format!("{} + {}", acc, amount),
            })
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34`. Debugging only; the storefront formats
/// for the customer's locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation, used when a discount amount becomes a line item price.
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(max.checked_mul(2), None);

        assert_eq!(
            Money::try_sum(vec![Money::from_cents(100), Money::from_cents(250)]).unwrap(),
            Money::from_cents(350)
        );
        assert!(matches!(
            Money::try_sum(vec![max, Money::from_cents(1)]),
            Err(CoreError::MoneyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_sum() {
        let items = [Money::from_cents(100), Money::from_cents(250), Money::from_cents(-50)];
        let total: Money = items.iter().sum();
        assert_eq!(total.cents(), 300);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(Money::from_cents(400).to_decimal(), dec!(4.00));
        assert_eq!(Money::from_decimal(dec!(20)).unwrap().cents(), 2000);
        assert_eq!(Money::from_decimal(dec!(19.9)).unwrap().cents(), 1990);
        assert_eq!(Money::from_decimal(dec!(-0.05)).unwrap().cents(), -5);
    }

    #[test]
    fn test_from_decimal_rejects_sub_cent_precision() {
        let err = Money::from_decimal(dec!(1.005)).unwrap_err();
        assert!(matches!(err, CoreError::MoneyOutOfRange { .. }));
    }

    #[test]
    fn test_from_decimal_rejects_overflow() {
        assert!(Money::from_decimal(Decimal::MAX).is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_ordering() {
        assert!(Money::from_cents(1500) > Money::from_cents(1000));
        assert_eq!(Money::from_cents(1000).max(Money::zero()).cents(), 1000);
    }
}
