//! Execution reports
//!
//! One execution is produced per matching attempt and consumed once by the
//! account ledger. A zero quantity denotes a rejection.

use crate::numeric::{Price, Quantity, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub time: Timestamp,
    pub price: Price,
    /// Signed fill size; zero for a rejection
    pub quantity: Quantity,
    /// Half-spread of the quote the fill was taken from
    pub half_spread: Decimal,
}

impl Execution {
    pub fn fill(time: Timestamp, price: Price, quantity: Quantity, half_spread: Decimal) -> Self {
        Self {
            time,
            price,
            quantity,
            half_spread,
        }
    }

    /// Rejection report quoting the price the order was last checked against.
    pub fn rejection(time: Timestamp, price: Price) -> Self {
        Self {
            time,
            price,
            quantity: Quantity::ZERO,
            half_spread: Decimal::ZERO,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Cash value exchanged, signed from the account's perspective.
    ///
    /// `None` when the product overflows.
    pub fn notional(&self) -> Option<Decimal> {
        self.quantity
            .as_decimal()
            .checked_mul(self.price.as_decimal())
            .map(|value| -value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_has_zero_quantity() {
        let exec = Execution::rejection("10".parse().unwrap(), "1.5".parse().unwrap());
        assert!(exec.is_rejection());
        assert_eq!(exec.notional(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_buy_notional_is_negative() {
        let exec = Execution::fill(
            "10".parse().unwrap(),
            "1.12".parse().unwrap(),
            "2".parse().unwrap(),
            Decimal::new(1, 2),
        );
        assert!(!exec.is_rejection());
        assert_eq!(exec.notional(), Some(Decimal::new(-224, 2)));
    }
}
