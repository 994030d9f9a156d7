//! Order sizing policy
//!
//! Decides the quantity an instruction is admitted with, given the current
//! position. Administrative regimes are never sized.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::Quantity;
use types::order::Regime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingPolicy {
    /// Unit quantity of a directional order
    pub unit: Quantity,
    /// Refuse orders adding to a position that already holds a unit
    pub max_qty: bool,
    /// Size orders against the position so they flip it to one unit
    pub abs_qty: bool,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            unit: Quantity::new(Decimal::ONE),
            max_qty: false,
            abs_qty: false,
        }
    }
}

/// Outcome of sizing one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    Admit(Quantity),
    /// Position already at the cap in the order's direction, or too large
    /// to size against
    Refuse,
}

impl SizingPolicy {
    /// Size an order of `regime` against the signed position `base`.
    pub fn size(&self, regime: Regime, base: Decimal) -> Sizing {
        if !regime.is_directional() {
            return Sizing::Admit(Quantity::ZERO);
        }
        let unit = self.unit.abs().as_decimal();
        let buy = regime.is_buy();

        if self.max_qty {
            let capped = if buy { base >= unit } else { base <= -unit };
            if capped {
                return Sizing::Refuse;
            }
        }

        let opposing = if buy { base < Decimal::ZERO } else { base > Decimal::ZERO };
        if self.abs_qty && opposing {
            match unit.checked_add(base.abs()) {
                Some(qty) => Sizing::Admit(Quantity::new(qty)),
                None => Sizing::Refuse,
            }
        } else {
            Sizing::Admit(Quantity::new(unit))
        }
    }
}
