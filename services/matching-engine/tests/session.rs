//! End-to-end session tests
//!
//! Drive `Session` with in-memory quote and order streams and check the
//! protocol lines it writes.

use matching_engine::sizing::SizingPolicy;
use matching_engine::{EngineConfig, Session};
use rust_decimal::Decimal;
use std::io::Cursor;

fn run(
    config: EngineConfig,
    quotes: &str,
    orders: &str,
) -> (Vec<String>, matching_engine::RunStats) {
    let mut out = Vec::new();
    let stats = Session::new(
        config,
        Cursor::new(quotes.to_owned()),
        Cursor::new(orders.to_owned()),
        &mut out,
    )
    .run()
    .unwrap();
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect();
    (lines, stats)
}

#[test]
fn test_market_long_fills_at_ask_in_force() {
    let quotes = "100\tEURUSD\t1.08\t1.10\n";
    let orders = "50\tLONG\tEURUSD\n";
    let (lines, stats) = run(EngineConfig::default(), quotes, orders);

    assert_eq!(
        lines,
        vec![
            "100\tEXE\tEURUSD\t1\t1.10".to_string(),
            "100\tACC\tEURUSD\t1.00\t-1.10\t0".to_string(),
        ]
    );
    assert_eq!(stats.instrument.as_deref(), Some("EURUSD"));
    assert_eq!(stats.counters.fills, 1);
    assert_eq!(stats.pending, 0);
}

#[test]
fn test_quote_wins_timestamp_ties() {
    // the order at t=100 sees the t=100 quote, not the t=90 one
    let quotes = "90\tX\t1.00\t1.02\n100\tX\t1.10\t1.12\n";
    let orders = "100\tSHORT\tX\n";
    let (lines, _) = run(EngineConfig::default(), quotes, orders);
    assert_eq!(lines[0], "100\tEXE\tX\t-1\t1.10");
}

#[test]
fn test_instrument_comes_from_orders() {
    let quotes = "1\tGBPUSD\t1.30\t1.31\n2\tEURUSD\t1.10\t1.12\n";
    let orders = "1\tL\tEURUSD\n";
    let (lines, stats) = run(EngineConfig::default(), quotes, orders);
    assert_eq!(lines[0], "2\tEXE\tEURUSD\t1\t1.12");
    assert_eq!(stats.quotes.foreign, 1);
}

#[test]
fn test_configured_instrument_filters_orders() {
    let quotes = "1\tEURUSD\t1.10\t1.12\n";
    let orders = "1\tL\tGBPUSD\n2\tS\tEURUSD\n";
    let config = EngineConfig {
        instrument: Some("EURUSD".into()),
        ..Default::default()
    };
    let (lines, stats) = run(config, quotes, orders);
    assert_eq!(lines[0], "2\tEXE\tEURUSD\t-1\t1.10");
    assert_eq!(stats.orders.foreign, 1);
}

#[test]
fn test_rejection_line() {
    let quotes = "1\tX\t1.10\t1.12\n20\tX\t1.10\t1.12\n";
    let orders = "2\tLONG\tX\t1.00\n";
    let config = EngineConfig {
        timeout: Some(Decimal::new(10, 0)),
        ..Default::default()
    };
    let (lines, stats) = run(config, quotes, orders);
    assert_eq!(lines, vec!["20\tREJ\tX\t0\t1.12".to_string()]);
    assert_eq!(stats.counters.rejections, 1);
}

#[test]
fn test_commission_and_spread_columns() {
    let quotes = "1\tX\t1.10\t1.12\n";
    let orders = "2\tLONG\tX\n";
    let config = EngineConfig {
        commission: types::fee::CommissionRate::new(Decimal::new(1, 4)),
        track_spread: true,
        ..Default::default()
    };
    let (lines, _) = run(config, quotes, orders);
    assert_eq!(lines[1], "2\tACC\tX\t1.00\t-1.12\t-0.0001\t-0.01");
}

#[test]
fn test_round_trip_with_absqty() {
    let quotes = "1\tX\t1.10\t1.12\n5\tX\t1.20\t1.22\n";
    let orders = "2\tLONG\tX\n6\tSHORT\tX\n7\tCANCEL\tX\n";
    let config = EngineConfig {
        sizing: SizingPolicy {
            abs_qty: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let (lines, stats) = run(config, quotes, orders);
    assert_eq!(
        lines,
        vec![
            "2\tEXE\tX\t1\t1.12".to_string(),
            "2\tACC\tX\t1.00\t-1.12\t0".to_string(),
            "6\tEXE\tX\t-2.00\t1.20".to_string(),
            "6\tACC\tX\t-1.00\t1.28\t0".to_string(),
            "7\tEXE\tX\t1.00\t1.22".to_string(),
            "7\tACC\tX\t0.00\t0.06\t0".to_string(),
        ]
    );
    assert!(stats.account.is_flat());
}

#[test]
fn test_malformed_and_unknown_lines_are_skipped() {
    let quotes = "junk\n1\tX\t1.10\t1.12\n";
    let orders = "oops\n2\tHOLD\tX\n3\tLONG\tX\n";
    let (lines, stats) = run(EngineConfig::default(), quotes, orders);
    assert_eq!(lines.len(), 2);
    assert_eq!(stats.quotes.malformed, 1);
    assert_eq!(stats.orders.malformed, 1);
    assert_eq!(stats.orders.unknown, 1);
}

#[test]
fn test_queue_grows_past_initial_capacity() {
    let quotes = "1\tX\t1.10\t1.12\n1000\tX\t1.10\t1.12\n";
    let mut orders = String::new();
    for t in 2..602 {
        orders.push_str(&format!("{t}\tLONG\tX\t1.00\n"));
    }
    let (lines, stats) = run(EngineConfig::default(), quotes, &orders);
    assert!(lines.is_empty());
    assert_eq!(stats.pending, 600);
    assert_eq!(stats.counters.admitted, 600);
}

#[test]
fn test_empty_streams() {
    let (lines, stats) = run(EngineConfig::default(), "", "");
    assert!(lines.is_empty());
    assert_eq!(stats.instrument, None);
}

#[test]
fn test_fill_overflowing_the_account_is_rejected() {
    let huge = "79228162514264337593543950000";
    let quotes = format!("1\tX\t{huge}\t{huge}\n");
    let orders = "1\tLONG\tX\n2\tLONG\tX\n";
    let (lines, stats) = run(EngineConfig::default(), &quotes, orders);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("1\tEXE\tX\t1\t{huge}"));
    assert!(lines[1].starts_with("1\tACC\tX\t1.00\t"));
    assert_eq!(lines[2], format!("2\tREJ\tX\t0\t{huge}"));
    assert_eq!(stats.counters.fills, 1);
    assert_eq!(stats.counters.rejections, 1);
    assert_eq!(stats.account.base, Decimal::ONE);
}

#[test]
fn test_quote_with_out_of_range_spread_is_skipped() {
    let quotes = "1\tX\t-79228162514264337593543950000\t79228162514264337593543950000\n\
                  2\tX\t1.10\t1.12\n";
    let orders = "1\tLONG\tX\n";
    let (lines, stats) = run(EngineConfig::default(), quotes, orders);

    assert_eq!(lines[0], "2\tEXE\tX\t1\t1.12");
    assert_eq!(stats.quotes.malformed, 1);
    assert_eq!(stats.quotes.accepted, 1);
    assert_eq!(stats.counters.fills, 1);
}
