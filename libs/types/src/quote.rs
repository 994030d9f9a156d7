//! Best bid/ask snapshot

use crate::numeric::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-of-book quote, superseded by the next one read from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Price,
    pub ask: Price,
}

impl Quote {
    pub fn new(bid: Price, ask: Price) -> Self {
        Self { bid, ask }
    }

    /// Half of ask minus bid; negative on a crossed quote.
    ///
    /// `None` when the difference does not fit a `Decimal`.
    pub fn half_spread(&self) -> Option<Decimal> {
        self.ask
            .as_decimal()
            .checked_sub(self.bid.as_decimal())?
            .checked_div(Decimal::TWO)
    }
}
