//! Commission calculation
//!
//! Commission is charged per unit of traded base quantity, in price units,
//! independent of the fill price.

use crate::numeric::Quantity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(per_unit: Decimal) -> Self {
        Self(per_unit)
    }

    pub fn per_unit(&self) -> Decimal {
        self.0
    }

    /// Commission charged for a fill, as a non-positive account delta.
    ///
    /// `None` when the product overflows.
    pub fn charge(&self, quantity: Quantity) -> Option<Decimal> {
        quantity
            .abs()
            .as_decimal()
            .checked_mul(self.0)
            .map(|value| -value)
    }
}
