//! Pull cursors over the quote and order streams
//!
//! Each cursor hands out one record per `advance()` call and never reads
//! ahead. Lines that fail to parse, belong to another instrument, or go
//! back in time are skipped; only a failing reader ends a feed with an
//! error.

use std::io::{self, BufRead};

use serde::Serialize;
use tracing::{debug, info, warn};
use types::numeric::Timestamp;
use types::order::{InstructionKind, OrderInstruction};
use types::quote::Quote;
use types::wire;

/// Fatal feed failure
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read {feed} stream after line {line}: {source}")]
    Io {
        feed: &'static str,
        line: u64,
        #[source]
        source: io::Error,
    },
}

/// Per-feed line accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub lines: u64,
    pub accepted: u64,
    pub malformed: u64,
    pub out_of_order: u64,
    /// Lines for another instrument
    pub foreign: u64,
    /// Order lines with an unrecognized verb
    pub unknown: u64,
}

struct LineCursor<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: u64,
    feed: &'static str,
}

impl<R: BufRead> LineCursor<R> {
    fn new(reader: R, feed: &'static str) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(128),
            line_no: 0,
            feed,
        }
    }

    /// Next raw line with its 1-based number. Invalid UTF-8 comes back as an
    /// empty line so it is skipped like any other malformed record.
    fn next_line(&mut self) -> Result<Option<(u64, &str)>, FeedError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| FeedError::Io {
                feed: self.feed,
                line: self.line_no,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((self.line_no, std::str::from_utf8(&self.buf).unwrap_or(""))))
    }
}

/// Instrument filter; locks onto the first symbol seen unless configured.
#[derive(Debug, Default)]
struct InstrumentFilter {
    symbol: Option<String>,
}

impl InstrumentFilter {
    fn admits(&mut self, symbol: &str, feed: &'static str) -> bool {
        match self.symbol.as_deref() {
            Some(locked) => locked == symbol,
            None => {
                info!(feed, instrument = symbol, "Instrument selected from stream");
                self.symbol = Some(symbol.to_owned());
                true
            }
        }
    }
}

/// Rejects records older than the last accepted one.
#[derive(Debug, Default)]
struct Chronology {
    last: Option<Timestamp>,
}

impl Chronology {
    fn accept(&mut self, time: Timestamp) -> Result<(), Timestamp> {
        match self.last {
            Some(last) if time < last => Err(last),
            _ => {
                self.last = Some(time);
                Ok(())
            }
        }
    }
}

/// Cursor over `<ts>\t<instrument>\t<bid>\t<ask>` lines
pub struct QuoteFeed<R> {
    cursor: LineCursor<R>,
    filter: InstrumentFilter,
    chronology: Chronology,
    stats: FeedStats,
}

impl<R: BufRead> QuoteFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            cursor: LineCursor::new(reader, "quote"),
            filter: InstrumentFilter::default(),
            chronology: Chronology::default(),
            stats: FeedStats::default(),
        }
    }

    pub fn set_instrument(&mut self, symbol: &str) {
        self.filter.symbol = Some(symbol.to_owned());
    }

    pub fn instrument(&self) -> Option<&str> {
        self.filter.symbol.as_deref()
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Next quote for the feed's instrument, `None` at end of stream.
    pub fn advance(&mut self) -> Result<Option<(Timestamp, Quote)>, FeedError> {
        while let Some((line_no, line)) = self.cursor.next_line()? {
            self.stats.lines += 1;
            let record = match wire::parse_quote(line) {
                Ok(record) => record,
                Err(err) => {
                    self.stats.malformed += 1;
                    debug!(line = line_no, error = %err, "Skipping malformed quote line");
                    continue;
                }
            };
            if record.quote.half_spread().is_none() {
                self.stats.malformed += 1;
                warn!(line = line_no, "Skipping quote with an out-of-range spread");
                continue;
            }
            if !self.filter.admits(record.instrument, "quote") {
                self.stats.foreign += 1;
                continue;
            }
            if let Err(last) = self.chronology.accept(record.time) {
                self.stats.out_of_order += 1;
                warn!(
                    line = line_no,
                    time = %record.time,
                    last = %last,
                    "Out-of-order quote skipped"
                );
                continue;
            }
            self.stats.accepted += 1;
            return Ok(Some((record.time, record.quote)));
        }
        Ok(None)
    }
}

/// Cursor over `<ts>\t<verb>\t<instrument>\t[<limit>]\t[<target>]\t[<stop>]`
/// lines
pub struct OrderFeed<R> {
    cursor: LineCursor<R>,
    filter: InstrumentFilter,
    chronology: Chronology,
    stats: FeedStats,
}

impl<R: BufRead> OrderFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            cursor: LineCursor::new(reader, "order"),
            filter: InstrumentFilter::default(),
            chronology: Chronology::default(),
            stats: FeedStats::default(),
        }
    }

    pub fn set_instrument(&mut self, symbol: &str) {
        self.filter.symbol = Some(symbol.to_owned());
    }

    /// Instrument the feed is locked onto, if any line fixed it yet
    pub fn instrument(&self) -> Option<&str> {
        self.filter.symbol.as_deref()
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Next instruction for the feed's instrument, `None` at end of stream.
    pub fn advance(&mut self) -> Result<Option<OrderInstruction>, FeedError> {
        while let Some((line_no, line)) = self.cursor.next_line()? {
            self.stats.lines += 1;
            let record = match wire::parse_order(line) {
                Ok(record) => record,
                Err(err) => {
                    self.stats.malformed += 1;
                    debug!(line = line_no, error = %err, "Skipping malformed order line");
                    continue;
                }
            };
            if record.kind == InstructionKind::Unknown {
                self.stats.unknown += 1;
                debug!(line = line_no, "Skipping order line with unknown verb");
                continue;
            }
            if !self.filter.admits(record.instrument, "order") {
                self.stats.foreign += 1;
                continue;
            }
            if let Err(last) = self.chronology.accept(record.time) {
                self.stats.out_of_order += 1;
                warn!(
                    line = line_no,
                    time = %record.time,
                    last = %last,
                    "Out-of-order order skipped"
                );
                continue;
            }
            self.stats.accepted += 1;
            return Ok(Some(OrderInstruction {
                time: record.time,
                kind: record.kind,
            }));
        }
        Ok(None)
    }
}
