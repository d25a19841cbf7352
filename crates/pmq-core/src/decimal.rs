//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic. Binary-outcome venues
//! quote prices on a fixed tick grid inside (0, 1); exact decimals keep tick
//! alignment checks exact instead of epsilon-based.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// True when the price lies strictly inside the (0, 1) outcome domain.
    #[inline]
    pub fn in_open_unit_interval(&self) -> bool {
        self.0 > Decimal::ZERO && self.0 < Decimal::ONE
    }

    /// Midpoint between two prices.
    #[inline]
    pub fn midpoint(a: Price, b: Price) -> Price {
        Self((a.0 + b.0) / Decimal::TWO)
    }

    /// True when the price is an exact multiple of `tick`.
    #[inline]
    pub fn is_on_tick(&self, tick: Price) -> bool {
        if tick.is_zero() {
            return false;
        }
        (self.0 % tick.0).is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Size/quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Notional value: size * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_midpoint() {
        let mid = Price::midpoint(Price::new(dec!(0.50)), Price::new(dec!(0.52)));
        assert_eq!(mid.inner(), dec!(0.51));
    }

    #[test]
    fn test_on_tick() {
        let tick = Price::new(dec!(0.01));
        assert!(Price::new(dec!(0.49)).is_on_tick(tick));
        assert!(!Price::new(dec!(0.495)).is_on_tick(tick));
        assert!(!Price::new(dec!(0.49)).is_on_tick(Price::ZERO));
    }

    #[test]
    fn test_open_unit_interval() {
        assert!(Price::new(dec!(0.01)).in_open_unit_interval());
        assert!(Price::new(dec!(0.99)).in_open_unit_interval());
        assert!(!Price::ZERO.in_open_unit_interval());
        assert!(!Price::ONE.in_open_unit_interval());
        assert!(!Price::new(dec!(1.01)).in_open_unit_interval());
    }

    #[test]
    fn test_notional() {
        let size = Size::new(dec!(40));
        let price = Price::new(dec!(0.51));
        assert_eq!(size.notional(price), dec!(20.40));
    }
}
