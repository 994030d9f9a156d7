//! Account state
//!
//! A running position/cash account for one simulated instrument. The engine
//! emits it as an ACC record after every fill.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running position and cash
///
/// `commission` and `spread` are cumulative costs and therefore carry a
/// non-positive sign under ordinary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Signed position in base units
    pub base: Decimal,
    /// Cash value in term units
    pub term: Decimal,
    pub commission: Decimal,
    pub spread: Decimal,
}

impl Account {
    pub fn new(base: Decimal, term: Decimal, commission: Decimal) -> Self {
        Self {
            base,
            term,
            commission,
            spread: Decimal::ZERO,
        }
    }

    pub fn with_spread(mut self, spread: Decimal) -> Self {
        self.spread = spread;
        self
    }

    pub fn is_flat(&self) -> bool {
        self.base.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_default_is_flat() {
        let account = Account::default();
        assert!(account.is_flat());
        assert_eq!(account.term, Decimal::ZERO);
        assert_eq!(account.spread, Decimal::ZERO);
    }

    #[test]
    fn test_with_spread() {
        let account = Account::new(Decimal::ONE, Decimal::new(-110, 2), Decimal::ZERO)
            .with_spread(Decimal::new(-1, 2));
        assert!(!account.is_flat());
        assert_eq!(account.spread, Decimal::new(-1, 2));
    }
}
