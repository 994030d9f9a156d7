//! Tab-separated record codec
//!
//! Parsing borrows the instrument symbol from the line so the caller decides
//! whether to intern it. Formatting writes fixed-point decimals only.

use crate::account::Account;
use crate::errors::WireError;
use crate::execution::Execution;
use crate::numeric::{Price, Quantity, Timestamp};
use crate::order::{InstructionKind, OrderPrices};
use crate::quote::Quote;
use rust_decimal::Decimal;
use std::io::{self, Write};

pub const TAG_EXECUTION: &str = "EXE";
pub const TAG_REJECTION: &str = "REJ";
pub const TAG_ACCOUNT: &str = "ACC";
pub const TAG_REALIZED: &str = "RPL";

/// `<ts>\t<instrument>\t<bid>\t<ask>[\t<bidsize>\t<asksize>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord<'a> {
    pub time: Timestamp,
    pub instrument: &'a str,
    pub quote: Quote,
}

/// `<ts>\t<verb>\t<instrument>\t[<limit>]\t[<target>]\t[<stop>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord<'a> {
    pub time: Timestamp,
    pub instrument: &'a str,
    pub kind: InstructionKind,
}

/// `<ts>\tACC\t<instrument>\t<base>\t<term>\t<commission>[\t<spread>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord<'a> {
    pub time: Timestamp,
    pub instrument: &'a str,
    pub account: Account,
}

fn fields(line: &str, expected: usize) -> Result<Vec<&str>, WireError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < expected {
        return Err(WireError::MissingFields {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

fn instrument(field: &str) -> Result<&str, WireError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(WireError::EmptyInstrument);
    }
    Ok(field)
}

/// Optional price leg: absent or empty means "not specified".
fn optional_price(
    fields: &[&str],
    idx: usize,
    name: &'static str,
) -> Result<Option<Price>, WireError> {
    match fields.get(idx).map(|f| f.trim()) {
        None | Some("") => Ok(None),
        Some(f) => f.parse().map(Some).map_err(WireError::bad(name)),
    }
}

pub fn parse_quote(line: &str) -> Result<QuoteRecord<'_>, WireError> {
    let f = fields(line, 4)?;
    Ok(QuoteRecord {
        time: f[0].parse().map_err(WireError::bad("timestamp"))?,
        instrument: instrument(f[1])?,
        quote: Quote::new(
            f[2].parse().map_err(WireError::bad("bid"))?,
            f[3].parse().map_err(WireError::bad("ask"))?,
        ),
    })
}

pub fn parse_order(line: &str) -> Result<OrderRecord<'_>, WireError> {
    let f = fields(line, 3)?;
    let time = f[0].parse().map_err(WireError::bad("timestamp"))?;
    let instrument = instrument(f[2])?;

    let prices = || -> Result<OrderPrices, WireError> {
        Ok(OrderPrices {
            limit: optional_price(&f, 3, "limit")?,
            target: optional_price(&f, 4, "target")?,
            stop: optional_price(&f, 5, "stop")?,
        })
    };

    // verbs are matched on their first letter: L(ONG), S(HORT), C(ANCEL), ...
    let kind = match f[1].trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('L') => InstructionKind::Long(prices()?),
        Some('S') => InstructionKind::Short(prices()?),
        Some('C') => InstructionKind::Cancel,
        Some('E') => InstructionKind::EmergencyClose,
        Some('T') => InstructionKind::Timeout,
        _ => InstructionKind::Unknown,
    };

    Ok(OrderRecord {
        time,
        instrument,
        kind,
    })
}

pub fn parse_account(line: &str) -> Result<AccountRecord<'_>, WireError> {
    let f = fields(line, 6)?;
    if f[1] != TAG_ACCOUNT {
        return Err(WireError::UnexpectedTag {
            found: f[1].to_string(),
            wanted: TAG_ACCOUNT,
        });
    }
    let decimal = |idx: usize, name: &'static str| -> Result<Decimal, WireError> {
        f[idx]
            .parse::<Quantity>()
            .map(|q| q.as_decimal())
            .map_err(WireError::bad(name))
    };
    let spread = match f.get(6).map(|s| s.trim()) {
        None | Some("") => Decimal::ZERO,
        Some(_) => decimal(6, "spread")?,
    };
    Ok(AccountRecord {
        time: f[0].parse().map_err(WireError::bad("timestamp"))?,
        instrument: instrument(f[2])?,
        account: Account::new(
            decimal(3, "base")?,
            decimal(4, "term")?,
            decimal(5, "commission")?,
        )
        .with_spread(spread),
    })
}

/// Fixed-point rendering; a negative zero prints as `0`.
pub fn fixed(value: Decimal) -> Decimal {
    if value.is_zero() {
        value.abs()
    } else {
        value
    }
}

/// EXE line for a fill, REJ line for a rejection
pub fn write_execution<W: Write>(
    out: &mut W,
    instrument: &str,
    execution: &Execution,
) -> io::Result<()> {
    let tag = if execution.is_rejection() {
        TAG_REJECTION
    } else {
        TAG_EXECUTION
    };
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        execution.time,
        tag,
        instrument,
        fixed(execution.quantity.as_decimal()),
        execution.price
    )
}

pub fn write_account<W: Write>(
    out: &mut W,
    time: Timestamp,
    instrument: &str,
    account: &Account,
    with_spread: bool,
) -> io::Result<()> {
    write!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}",
        time,
        TAG_ACCOUNT,
        instrument,
        fixed(account.base),
        fixed(account.term),
        fixed(account.commission)
    )?;
    if with_spread {
        write!(out, "\t{}", fixed(account.spread))?;
    }
    writeln!(out)
}

/// Realized PnL components of one interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Realized {
    pub pnl: Decimal,
    pub commission: Decimal,
    pub spread: Decimal,
}

pub fn write_realized<W: Write>(
    out: &mut W,
    time: Timestamp,
    instrument: &str,
    realized: &Realized,
    breakdown: bool,
) -> io::Result<()> {
    write!(
        out,
        "{}\t{}\t{}\t{}",
        time,
        TAG_REALIZED,
        instrument,
        fixed(realized.pnl)
    )?;
    if breakdown {
        write!(
            out,
            "\t{}\t{}",
            fixed(realized.commission),
            fixed(realized.spread)
        )?;
    }
    writeln!(out)
}
