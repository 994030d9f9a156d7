//! Crossing detection logic
//!
//! Decides whether an order crosses the quote in force and at which price.
//! Buys take the ask, sells hit the bid.

use types::numeric::Price;
use types::order::Regime;
use types::quote::Quote;

/// Side of the quote an order of `regime` trades against.
pub fn reference_price(regime: Regime, quote: &Quote) -> Price {
    if regime.is_buy() {
        quote.ask
    } else {
        quote.bid
    }
}

/// Check if a limit is satisfied by the reference price.
///
/// A missing limit is a market order and always crosses.
pub fn limit_crosses(regime: Regime, limit: Option<Price>, reference: Price) -> bool {
    match limit {
        None => true,
        Some(limit) if regime.is_buy() => reference <= limit,
        Some(limit) => reference >= limit,
    }
}

/// Check if a bracket stop has been touched.
///
/// A LongReverse closes a short and triggers when the ask rises to the stop;
/// a ShortReverse closes a long and triggers when the bid falls to it.
pub fn stop_triggered(regime: Regime, stop: Option<Price>, quote: &Quote) -> bool {
    match (regime, stop) {
        (Regime::LongReverse, Some(stop)) => quote.ask >= stop,
        (Regime::ShortReverse, Some(stop)) => quote.bid <= stop,
        _ => false,
    }
}

/// Fill price of a directional order against `quote`, or `None` if it does
/// not cross.
pub fn fill_price(
    regime: Regime,
    limit: Option<Price>,
    stop: Option<Price>,
    quote: &Quote,
) -> Option<Price> {
    if !regime.is_directional() {
        return None;
    }
    let reference = reference_price(regime, quote);
    if limit_crosses(regime, limit, reference) || stop_triggered(regime, stop, quote) {
        Some(reference)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn quote(bid: &str, ask: &str) -> Quote {
        Quote::new(px(bid), px(ask))
    }

    #[test]
    fn test_market_orders_take_the_touch() {
        let q = quote("1.10", "1.12");
        assert_eq!(fill_price(Regime::Long, None, None, &q), Some(px("1.12")));
        assert_eq!(fill_price(Regime::Short, None, None, &q), Some(px("1.10")));
    }

    #[test]
    fn test_long_limit() {
        let q = quote("1.10", "1.12");
        assert_eq!(fill_price(Regime::Long, Some(px("1.12")), None, &q), Some(px("1.12")));
        assert_eq!(fill_price(Regime::Long, Some(px("1.11")), None, &q), None);
    }

    #[test]
    fn test_short_limit() {
        let q = quote("1.10", "1.12");
        assert_eq!(fill_price(Regime::Short, Some(px("1.10")), None, &q), Some(px("1.10")));
        assert_eq!(fill_price(Regime::Short, Some(px("1.11")), None, &q), None);
    }

    #[test]
    fn test_stop_only_applies_to_brackets() {
        let q = quote("0.99", "1.01");
        // ShortReverse closing a long: bid fell through the stop
        assert_eq!(
            fill_price(Regime::ShortReverse, Some(px("1.20")), Some(px("1.00")), &q),
            Some(px("0.99"))
        );
        // the same stop on an entry order is ignored
        assert_eq!(fill_price(Regime::Short, Some(px("1.20")), Some(px("1.00")), &q), None);
    }

    #[test]
    fn test_long_reverse_stop() {
        let q = quote("1.19", "1.21");
        assert_eq!(
            fill_price(Regime::LongReverse, Some(px("1.00")), Some(px("1.20")), &q),
            Some(px("1.21"))
        );
        let calm = quote("1.10", "1.12");
        assert_eq!(
            fill_price(Regime::LongReverse, Some(px("1.00")), Some(px("1.20")), &calm),
            None
        );
    }

    #[test]
    fn test_admin_regimes_never_cross() {
        let q = quote("1.10", "1.12");
        assert_eq!(fill_price(Regime::Cancel, None, None, &q), None);
        assert_eq!(fill_price(Regime::Timeout, None, None, &q), None);
    }
}
