//! Order lifecycle types
//!
//! An order is created from an order-feed instruction (or synthesized as a
//! bracket), waits in the queue while `Pending`, and is tombstoned in place
//! once it reaches a terminal state.

use crate::ids::OrderId;
use crate::numeric::{Price, Quantity, Timestamp};
use serde::{Deserialize, Serialize};

/// Directional or administrative regime of an order.
///
/// The discriminants are chosen so that `regime ^ Cancel` swaps the
/// direction: `Long ^ Cancel == Short` and
/// `LongReverse ^ Cancel == ShortReverse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Regime {
    Long = 1,
    Short = 2,
    Cancel = 3,
    Timeout = 4,
    LongReverse = 5,
    ShortReverse = 6,
    EmergencyClose = 7,
}

impl Regime {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Regime::Long),
            2 => Some(Regime::Short),
            3 => Some(Regime::Cancel),
            4 => Some(Regime::Timeout),
            5 => Some(Regime::LongReverse),
            6 => Some(Regime::ShortReverse),
            7 => Some(Regime::EmergencyClose),
            _ => None,
        }
    }

    /// Opposite direction, for directional regimes only.
    pub fn opposite(&self) -> Option<Self> {
        if !self.is_directional() {
            return None;
        }
        Self::from_bits(*self as u8 ^ Regime::Cancel as u8)
    }

    /// Regime of the bracket order closing a fill of this regime.
    ///
    /// Entry regimes map to the opposite reverse regime; brackets do not
    /// spawn brackets.
    pub fn reverse(&self) -> Option<Self> {
        match self {
            Regime::Long | Regime::Short => self
                .opposite()
                .and_then(|r| Self::from_bits(r as u8 | Regime::Timeout as u8)),
            _ => None,
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(
            self,
            Regime::Long | Regime::Short | Regime::LongReverse | Regime::ShortReverse
        )
    }

    /// True for regimes that buy when they fill.
    pub fn is_buy(&self) -> bool {
        matches!(self, Regime::Long | Regime::LongReverse)
    }

    /// True for bracket regimes.
    pub fn is_reverse(&self) -> bool {
        matches!(self, Regime::LongReverse | Regime::ShortReverse)
    }
}

/// Order state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    /// Waiting in the queue
    Pending,
    Filled,
    /// Past its good-till without a match
    Rejected,
    /// Expired by a timeout instruction
    Expired,
    Cancelled,
}

impl OrderState {
    /// Check if state is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Pending)
    }
}

/// An order in the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub regime: Regime,
    pub state: OrderState,
    /// Earliest time the order may be matched
    pub submit_time: Timestamp,
    pub good_till: Timestamp,
    /// Unsigned size
    pub quantity: Quantity,
    pub limit: Option<Price>,
    pub target: Option<Price>,
    pub stop: Option<Price>,
}

impl Order {
    /// Create a new pending order
    pub fn new(
        regime: Regime,
        submit_time: Timestamp,
        good_till: Timestamp,
        quantity: Quantity,
        prices: OrderPrices,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            regime,
            state: OrderState::Pending,
            submit_time,
            good_till,
            quantity: quantity.abs(),
            limit: prices.limit,
            target: prices.target,
            stop: prices.stop,
        }
    }

    /// Synthesize the bracket closing a fill of this order.
    ///
    /// Returns `None` when the order carries no target or has no bracket
    /// regime.
    pub fn bracket(&self, filled: Quantity, fill_time: Timestamp) -> Option<Order> {
        let target = self.target?;
        let regime = self.regime.reverse()?;
        Some(Order::new(
            regime,
            fill_time,
            Timestamp::MAX,
            filled.abs(),
            OrderPrices {
                limit: Some(target),
                target: None,
                stop: self.stop,
            },
        ))
    }

    pub fn is_live(&self) -> bool {
        self.state == OrderState::Pending
    }

    /// Tombstone the order.
    ///
    /// # Panics
    /// Panics if the order is already dead
    pub fn settle(&mut self, state: OrderState) {
        assert!(self.is_live(), "Cannot settle a dead order");
        assert!(state.is_terminal(), "Settle requires a terminal state");
        self.state = state;
    }
}

/// Optional price legs of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPrices {
    pub limit: Option<Price>,
    pub target: Option<Price>,
    pub stop: Option<Price>,
}

/// Parsed order-feed instruction for the engine's instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInstruction {
    pub time: Timestamp,
    pub kind: InstructionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb")]
pub enum InstructionKind {
    Long(OrderPrices),
    Short(OrderPrices),
    Cancel,
    EmergencyClose,
    Timeout,
    Unknown,
}

impl InstructionKind {
    /// Regime of the order this instruction admits
    pub fn regime(&self) -> Option<Regime> {
        match self {
            InstructionKind::Long(_) => Some(Regime::Long),
            InstructionKind::Short(_) => Some(Regime::Short),
            InstructionKind::Cancel => Some(Regime::Cancel),
            InstructionKind::EmergencyClose => Some(Regime::EmergencyClose),
            InstructionKind::Timeout => Some(Regime::Timeout),
            InstructionKind::Unknown => None,
        }
    }

    pub fn prices(&self) -> OrderPrices {
        match self {
            InstructionKind::Long(p) | InstructionKind::Short(p) => *p,
            _ => OrderPrices::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn test_regime_opposite_xor() {
        assert_eq!(Regime::Long.opposite(), Some(Regime::Short));
        assert_eq!(Regime::Short.opposite(), Some(Regime::Long));
        assert_eq!(Regime::LongReverse.opposite(), Some(Regime::ShortReverse));
        assert_eq!(Regime::ShortReverse.opposite(), Some(Regime::LongReverse));
        assert_eq!(Regime::Cancel.opposite(), None);
        assert_eq!(Regime::Timeout.opposite(), None);
    }

    #[test]
    fn test_regime_reverse() {
        assert_eq!(Regime::Long.reverse(), Some(Regime::ShortReverse));
        assert_eq!(Regime::Short.reverse(), Some(Regime::LongReverse));
        assert_eq!(Regime::ShortReverse.reverse(), None);
        assert_eq!(Regime::EmergencyClose.reverse(), None);
    }

    #[test]
    fn test_order_creation() {
        let order = Order::new(
            Regime::Short,
            ts("100"),
            Timestamp::MAX,
            "-2".parse().unwrap(),
            OrderPrices::default(),
        );
        assert!(order.is_live());
        assert_eq!(order.quantity, "2".parse().unwrap());
    }

    #[test]
    fn test_bracket_from_target() {
        let order = Order::new(
            Regime::Long,
            ts("100"),
            Timestamp::MAX,
            "1".parse().unwrap(),
            OrderPrices {
                limit: None,
                target: Some(px("1.20")),
                stop: Some(px("1.00")),
            },
        );
        let bracket = order.bracket("1".parse().unwrap(), ts("150")).unwrap();
        assert_eq!(bracket.regime, Regime::ShortReverse);
        assert_eq!(bracket.limit, Some(px("1.20")));
        assert_eq!(bracket.stop, Some(px("1.00")));
        assert_eq!(bracket.target, None);
        assert_eq!(bracket.submit_time, ts("150"));
        assert!(bracket.good_till.is_never());
        assert_eq!(bracket.quantity, "1".parse().unwrap());
    }

    #[test]
    fn test_no_bracket_without_target() {
        let order = Order::new(
            Regime::Long,
            ts("100"),
            Timestamp::MAX,
            "1".parse().unwrap(),
            OrderPrices::default(),
        );
        assert!(order.bracket("1".parse().unwrap(), ts("100")).is_none());
    }

    #[test]
    fn test_settle_tombstones() {
        let mut order = Order::new(
            Regime::Long,
            ts("1"),
            Timestamp::MAX,
            "1".parse().unwrap(),
            OrderPrices::default(),
        );
        order.settle(OrderState::Filled);
        assert!(!order.is_live());
        assert!(order.state.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Cannot settle a dead order")]
    fn test_settle_twice_panics() {
        let mut order = Order::new(
            Regime::Long,
            ts("1"),
            Timestamp::MAX,
            "1".parse().unwrap(),
            OrderPrices::default(),
        );
        order.settle(OrderState::Cancelled);
        order.settle(OrderState::Rejected);
    }

    #[test]
    fn test_instruction_serialization() {
        let kind = InstructionKind::Long(OrderPrices {
            limit: Some(px("1.5")),
            target: None,
            stop: None,
        });
        let json = serde_json::to_string(&kind).unwrap();
        let back: InstructionKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}
