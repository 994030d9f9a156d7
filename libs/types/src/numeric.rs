//! Fixed-point decimal types for timestamps, prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Values keep the scale they were parsed with, so a record formats back
//! exactly as it was read.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Round to `dp` decimal places (half away from zero) and pin the scale to
/// exactly `dp`, so quantized values always print with the same width.
pub fn quantize(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Parse a plain fixed-point decimal field.
///
/// Scientific notation is refused; the tab protocol only carries fixed-point.
fn parse_field(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() || s.contains(['e', 'E']) {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Point in time, in (fractional) seconds since the epoch.
///
/// `Timestamp::MAX` stands for "never" and is used as the default good-till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Decimal);

impl Timestamp {
    /// +∞ sentinel
    pub const MAX: Self = Self(Decimal::MAX);

    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(seconds: Decimal) -> Self {
        Self(seconds)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_never(&self) -> bool {
        *self == Self::MAX
    }

    /// Shift by `seconds`; the +∞ sentinel absorbs any shift and overflow
    /// saturates to it.
    pub fn after(self, seconds: Decimal) -> Self {
        if self.is_never() {
            return self;
        }
        self.0.checked_add(seconds).map(Self).unwrap_or(Self::MAX)
    }
}

impl FromStr for Timestamp {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field(s)
            .map(Self)
            .ok_or_else(|| NumericError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price in term currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field(s)
            .map(Self)
            .ok_or_else(|| NumericError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed quantity in base currency units.
///
/// Positive quantities buy, negative quantities sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl Neg for Quantity {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl FromStr for Quantity {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_field(s)
            .map(Self)
            .ok_or_else(|| NumericError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    #[error("malformed decimal field: {0:?}")]
    Malformed(String),
}
