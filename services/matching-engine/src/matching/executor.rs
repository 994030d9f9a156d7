//! Execution building
//!
//! Turns a matching decision into an `Execution` report. Orders are filled
//! in full at the touch; there are no partial fills.

use rust_decimal::Decimal;
use types::execution::Execution;
use types::numeric::{Quantity, Timestamp};
use types::order::{Order, Regime};
use types::quote::Quote;

use super::crossing;

/// Outcome of evaluating one pending directional order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Fill(Execution),
    /// Bracket with nothing left to close
    Void,
    /// Good-till passed without a match
    Expired(Execution),
    Wait,
}

/// Quantity a bracket may still fill: capped to the position it closes.
///
/// Returns `None` when the position is flat or on the bracket's own side.
pub fn bracket_quantity(order: &Order, base: Decimal) -> Option<Quantity> {
    let closes = if order.regime.is_buy() {
        base < Decimal::ZERO
    } else {
        base > Decimal::ZERO
    };
    if !closes {
        return None;
    }
    let cap = base.abs();
    let qty = order.quantity.as_decimal().min(cap);
    Some(Quantity::new(qty))
}

/// Evaluate a directional order against the quote in force at `now`.
///
/// The order matches first; expiry is only checked when it does not.
pub fn evaluate(order: &Order, quote: &Quote, base: Decimal, now: Timestamp) -> Evaluation {
    let quantity = if order.regime.is_reverse() {
        match bracket_quantity(order, base) {
            Some(qty) => qty,
            None => return Evaluation::Void,
        }
    } else {
        order.quantity
    };

    // a quote whose spread does not fit a decimal cannot be traded against
    let crossing = crossing::fill_price(order.regime, order.limit, order.stop, quote)
        .zip(quote.half_spread());
    if let Some((price, half_spread)) = crossing {
        let signed = if order.regime.is_buy() { quantity } else { -quantity };
        return Evaluation::Fill(Execution::fill(now, price, signed, half_spread));
    }

    if order.good_till <= now {
        let price = crossing::reference_price(order.regime, quote);
        return Evaluation::Expired(Execution::rejection(now, price));
    }
    Evaluation::Wait
}

/// Market execution bringing `base` back to zero.
///
/// A long position is sold at the bid, a short one bought at the ask.
/// `None` when flat or when the quote's spread is out of range.
pub fn flatten(base: Decimal, quote: &Quote, now: Timestamp) -> Option<Execution> {
    if base.is_zero() {
        return None;
    }
    let half_spread = quote.half_spread()?;
    let regime = if base > Decimal::ZERO {
        Regime::Short
    } else {
        Regime::Long
    };
    let price = crossing::reference_price(regime, quote);
    Some(Execution::fill(now, price, Quantity::new(-base), half_spread))
}

/// Rejection report for an order expired by a timeout instruction.
pub fn expire(order: &Order, quote: &Quote, now: Timestamp) -> Execution {
    Execution::rejection(now, crossing::reference_price(order.regime, quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::Price;
    use types::order::OrderPrices;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn order(regime: Regime, qty: &str, good_till: Timestamp, prices: OrderPrices) -> Order {
        Order::new(regime, ts("0"), good_till, qty.parse().unwrap(), prices)
    }

    fn quote() -> Quote {
        Quote::new(px("1.10"), px("1.12"))
    }

    #[test]
    fn test_market_long_fills_at_ask() {
        let o = order(Regime::Long, "2", Timestamp::MAX, OrderPrices::default());
        match evaluate(&o, &quote(), Decimal::ZERO, ts("100")) {
            Evaluation::Fill(exec) => {
                assert_eq!(exec.price, px("1.12"));
                assert_eq!(exec.quantity.as_decimal(), dec("2"));
                assert_eq!(exec.half_spread, dec("0.01"));
                assert_eq!(exec.time, ts("100"));
            }
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn test_short_sells() {
        let o = order(Regime::Short, "1", Timestamp::MAX, OrderPrices::default());
        let Evaluation::Fill(exec) = evaluate(&o, &quote(), Decimal::ZERO, ts("1")) else {
            panic!("expected fill");
        };
        assert_eq!(exec.price, px("1.10"));
        assert_eq!(exec.quantity.as_decimal(), dec("-1"));
    }

    #[test]
    fn test_unmatched_order_waits_then_expires() {
        let prices = OrderPrices {
            limit: Some(px("1.00")),
            ..Default::default()
        };
        let o = order(Regime::Long, "1", ts("200"), prices);
        assert_eq!(evaluate(&o, &quote(), Decimal::ZERO, ts("199")), Evaluation::Wait);
        match evaluate(&o, &quote(), Decimal::ZERO, ts("200")) {
            Evaluation::Expired(exec) => {
                assert!(exec.is_rejection());
                assert_eq!(exec.price, px("1.12"));
            }
            other => panic!("expected expiry, got {other:?}"),
        }
    }

    #[test]
    fn test_match_wins_over_expiry() {
        let o = order(Regime::Long, "1", ts("100"), OrderPrices::default());
        assert!(matches!(
            evaluate(&o, &quote(), Decimal::ZERO, ts("100")),
            Evaluation::Fill(_)
        ));
    }

    #[test]
    fn test_bracket_capped_to_position() {
        let prices = OrderPrices {
            limit: Some(px("1.05")),
            ..Default::default()
        };
        let bracket = order(Regime::ShortReverse, "3", Timestamp::MAX, prices);
        assert_eq!(bracket_quantity(&bracket, dec("2")), Some(Quantity::new(dec("2"))));
        assert_eq!(bracket_quantity(&bracket, dec("5")), Some(Quantity::new(dec("3"))));
        assert_eq!(bracket_quantity(&bracket, Decimal::ZERO), None);
        assert_eq!(bracket_quantity(&bracket, dec("-1")), None);

        let Evaluation::Fill(exec) = evaluate(&bracket, &quote(), dec("2"), ts("5")) else {
            panic!("expected fill");
        };
        assert_eq!(exec.quantity.as_decimal(), dec("-2"));
    }

    #[test]
    fn test_bracket_on_flat_position_is_void() {
        let bracket = order(Regime::LongReverse, "1", Timestamp::MAX, OrderPrices::default());
        assert_eq!(evaluate(&bracket, &quote(), Decimal::ZERO, ts("5")), Evaluation::Void);
    }

    #[test]
    fn test_flatten() {
        let q = quote();
        let sell = flatten(dec("2"), &q, ts("7")).unwrap();
        assert_eq!(sell.price, px("1.10"));
        assert_eq!(sell.quantity.as_decimal(), dec("-2"));

        let buy = flatten(dec("-1.5"), &q, ts("7")).unwrap();
        assert_eq!(buy.price, px("1.12"));
        assert_eq!(buy.quantity.as_decimal(), dec("1.5"));

        assert!(flatten(Decimal::ZERO, &q, ts("7")).is_none());
    }

    #[test]
    fn test_out_of_range_spread_never_fills() {
        let wide = Quote::new(
            px("-79228162514264337593543950000"),
            px("79228162514264337593543950000"),
        );
        let o = order(Regime::Long, "1", Timestamp::MAX, OrderPrices::default());
        assert_eq!(evaluate(&o, &wide, Decimal::ZERO, ts("1")), Evaluation::Wait);
        assert!(flatten(dec("1"), &wide, ts("1")).is_none());
    }

    #[test]
    fn test_expire_quotes_reference_price() {
        let o = order(Regime::Short, "1", Timestamp::MAX, OrderPrices::default());
        let exec = expire(&o, &quote(), ts("9"));
        assert!(exec.is_rejection());
        assert_eq!(exec.price, px("1.10"));
    }
}
