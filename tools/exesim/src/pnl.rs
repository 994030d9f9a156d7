//! Realized PnL recovery
//!
//! Under weighted-average-cost accounting the cumulative cash of an account,
//! plotted against its position, is piecewise linear. Extrapolating the line
//! through two successive snapshots to a flat position gives the value
//! booked so far:
//!
//! ```text
//! cumulative(m) = (a.m * l.base - a.base * l.m) / (l.base - a.base)
//! ```
//!
//! where `l` is the previous snapshot, `a` the current one, and `m` the term,
//! commission or spread column. The realized amount of an interval is the
//! change of that value since the last interval.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info, warn};
use types::account::Account;
use types::ids::{InstrumentId, InstrumentRegistry};
use types::numeric::Timestamp;
use types::wire::{self, Realized};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnlConfig {
    /// Decimal places of emitted values
    pub precision: u32,
    /// Emit commission and spread columns
    pub breakdown: bool,
}

impl Default for PnlConfig {
    fn default() -> Self {
        Self {
            precision: 8,
            breakdown: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PnlError {
    #[error("failed to read account stream after line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// Value booked up to `a`, extrapolated along the line through `l` and `a`.
///
/// `None` when the positions are equal or the arithmetic overflows.
fn cumulative(l_base: Decimal, l_m: Decimal, a_base: Decimal, a_m: Decimal) -> Option<Decimal> {
    let numerator = a_m.checked_mul(l_base)?.checked_sub(a_base.checked_mul(l_m)?)?;
    let denominator = l_base.checked_sub(a_base)?;
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// Incremental realized PnL of one account stream
#[derive(Debug, Clone, Copy, Default)]
pub struct RealizedPnl {
    prev: Option<Account>,
    accumulated: Realized,
}

impl RealizedPnl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative realized values as of the last non-degenerate interval
    pub fn accumulated(&self) -> Realized {
        self.accumulated
    }

    /// Feed the next snapshot and return what was realized since the
    /// previous one.
    ///
    /// Returns `None` for the first snapshot and whenever the position did
    /// not change; the snapshot still becomes the new reference point.
    pub fn observe(&mut self, account: &Account) -> Option<Realized> {
        let l = self.prev.replace(*account)?;
        let a = account;
        if l.base == a.base {
            return None;
        }

        let cum = Realized {
            pnl: cumulative(l.base, l.term, a.base, a.term)?,
            commission: cumulative(l.base, l.commission, a.base, a.commission)?,
            spread: cumulative(l.base, l.spread, a.base, a.spread)?,
        };
        let increment = Realized {
            pnl: cum.pnl.checked_sub(self.accumulated.pnl)?,
            commission: cum.commission.checked_sub(self.accumulated.commission)?,
            spread: cum.spread.checked_sub(self.accumulated.spread)?,
        };
        self.accumulated = cum;
        Some(increment)
    }
}

/// Round to `precision` places and strip trailing zeros.
pub fn round_output(realized: &Realized, precision: u32) -> Realized {
    let round = |value: Decimal| {
        value
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    };
    Realized {
        pnl: round(realized.pnl),
        commission: round(realized.commission),
        spread: round(realized.spread),
    }
}

/// Line accounting of one extractor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PnlStats {
    pub lines: u64,
    pub snapshots: u64,
    pub malformed: u64,
    pub out_of_order: u64,
    /// Snapshot pairs skipped because the position did not move
    pub unchanged: u64,
    pub emitted: u64,
    pub instruments: usize,
}

#[derive(Debug, Default)]
struct Track {
    pnl: RealizedPnl,
    last: Option<Timestamp>,
}

/// Per-instrument realized PnL over a stream of ACC lines
pub struct PnlExtractor {
    config: PnlConfig,
    registry: InstrumentRegistry,
    tracks: HashMap<InstrumentId, Track>,
    stats: PnlStats,
}

impl PnlExtractor {
    pub fn new(config: PnlConfig) -> Self {
        Self {
            config,
            registry: InstrumentRegistry::new(),
            tracks: HashMap::new(),
            stats: PnlStats::default(),
        }
    }

    pub fn stats(&self) -> PnlStats {
        self.stats
    }

    /// Realized state of `symbol`, if it was seen
    pub fn state(&self, symbol: &str) -> Option<&RealizedPnl> {
        let id = self.registry.get(symbol)?;
        self.tracks.get(&id).map(|track| &track.pnl)
    }

    /// Process one ACC line, writing an RPL line when something was realized.
    pub fn process_line<W: Write>(
        &mut self,
        line_no: u64,
        line: &str,
        out: &mut W,
    ) -> io::Result<()> {
        self.stats.lines += 1;
        let record = match wire::parse_account(line) {
            Ok(record) => record,
            Err(err) => {
                self.stats.malformed += 1;
                debug!(line = line_no, error = %err, "Skipping malformed account line");
                return Ok(());
            }
        };

        let id = self.registry.intern(record.instrument);
        let track = self.tracks.entry(id).or_default();
        if let Some(last) = track.last {
            if record.time < last {
                self.stats.out_of_order += 1;
                warn!(
                    line = line_no,
                    instrument = record.instrument,
                    time = %record.time,
                    last = %last,
                    "Out-of-order account snapshot skipped"
                );
                return Ok(());
            }
        }
        track.last = Some(record.time);
        self.stats.snapshots += 1;

        let seeded = track.pnl.prev.is_some();
        match track.pnl.observe(&record.account) {
            Some(increment) => {
                let realized = round_output(&increment, self.config.precision);
                wire::write_realized(
                    out,
                    record.time,
                    record.instrument,
                    &realized,
                    self.config.breakdown,
                )?;
                self.stats.emitted += 1;
            }
            None if seeded => self.stats.unchanged += 1,
            None => {}
        }
        Ok(())
    }

    /// Process a whole stream.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> Result<PnlStats, PnlError> {
        let mut buf = Vec::with_capacity(128);
        let mut line_no = 0u64;
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .map_err(|source| PnlError::Read { line: line_no, source })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let line = std::str::from_utf8(&buf).unwrap_or("");
            self.process_line(line_no, line, &mut out)?;
        }
        out.flush()?;

        self.stats.instruments = self.registry.len();
        info!(
            snapshots = self.stats.snapshots,
            emitted = self.stats.emitted,
            instruments = self.stats.instruments,
            "Account stream processed"
        );
        Ok(self.stats)
    }
}
