//! Matching engine core
//!
//! `MatchingEngine` owns the order queue and the account, and drains due
//! orders against the quote in force. `Session` drives it from the two
//! feeds and writes the protocol lines.

use std::io::{self, BufRead, Write};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use types::account::Account;
use types::execution::Execution;
use types::fee::CommissionRate;
use types::ids::OrderId;
use types::numeric::Timestamp;
use types::order::{Order, OrderInstruction, OrderState, Regime};
use types::quote::Quote;
use types::wire;

use crate::events::EngineEvent;
use crate::feed::{FeedError, FeedStats, OrderFeed, QuoteFeed};
use crate::ledger;
use crate::matching::executor::{self, Evaluation};
use crate::queue::OrderQueue;
use crate::sizing::{Sizing, SizingPolicy};

/// Configuration for the engine and its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Delay between an order line and its first evaluation, in seconds
    pub exe_delay: Decimal,
    /// Good-till window of directional orders, in seconds
    pub timeout: Option<Decimal>,
    pub commission: CommissionRate,
    pub sizing: SizingPolicy,
    /// Decimal places of account base and term
    pub quantum: u32,
    /// Instrument to simulate; taken from the first order line when unset
    pub instrument: Option<String>,
    /// Emit the spread cost column on ACC lines
    pub track_spread: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exe_delay: Decimal::ZERO,
            timeout: None,
            commission: CommissionRate::ZERO,
            sizing: SizingPolicy::default(),
            quantum: 2,
            instrument: None,
            track_spread: false,
        }
    }
}

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Order lifecycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineCounters {
    pub admitted: u64,
    /// Refused by the sizing policy
    pub refused: u64,
    pub fills: u64,
    pub rejections: u64,
    pub cancelled: u64,
    pub brackets: u64,
}

/// Main matching engine
pub struct MatchingEngine {
    config: EngineConfig,
    queue: OrderQueue,
    account: Account,
    /// Quote in force
    quote: Option<Quote>,
    /// Timestamp of the last consumed record
    metronome: Timestamp,
    counters: EngineCounters,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            queue: OrderQueue::new(),
            account: Account::default(),
            quote: None,
            metronome: Timestamp::ZERO,
            counters: EngineCounters::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn metronome(&self) -> Timestamp {
        self.metronome
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    pub fn counters(&self) -> EngineCounters {
        self.counters
    }

    /// Queue an instruction as an order.
    ///
    /// Returns false when the instruction is not admitted (unknown verb or
    /// refused by the sizing policy).
    pub fn admit(&mut self, instruction: OrderInstruction) -> bool {
        let Some(regime) = instruction.kind.regime() else {
            return false;
        };
        let quantity = match self.config.sizing.size(regime, self.account.base) {
            Sizing::Admit(quantity) => quantity,
            Sizing::Refuse => {
                self.counters.refused += 1;
                debug!(
                    time = %instruction.time,
                    ?regime,
                    base = %self.account.base,
                    "Order refused by sizing policy"
                );
                return false;
            }
        };

        let submit_time = if regime == Regime::EmergencyClose {
            instruction.time
        } else {
            instruction.time.after(self.config.exe_delay)
        };
        let good_till = match self.config.timeout {
            Some(window) if regime.is_directional() => submit_time.after(window),
            _ => Timestamp::MAX,
        };

        let order = Order::new(
            regime,
            submit_time,
            good_till,
            quantity,
            instruction.kind.prices(),
        );
        debug!(
            order_id = %order.order_id,
            ?regime,
            quantity = %order.quantity,
            submit_time = %order.submit_time,
            "Order admitted"
        );
        self.queue.push(order);
        self.counters.admitted += 1;
        true
    }

    /// Put `quote` in force.
    pub fn on_quote(&mut self, quote: Quote) {
        self.quote = Some(quote);
    }

    /// Move the metronome to `time`; it never goes backwards.
    pub fn advance_clock(&mut self, time: Timestamp) {
        if time > self.metronome {
            self.metronome = time;
        }
    }

    /// Evaluate every due order against the quote in force.
    ///
    /// Orders are visited in queue order. Brackets spawned by a fill are
    /// appended to the queue and visited in the same pass.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        let Some(quote) = self.quote else {
            return events;
        };
        let now = self.metronome;

        let mut idx = self.queue.head();
        while idx < self.queue.tail() {
            let order = &self.queue[idx];
            let (due, regime) = (order.is_live() && order.submit_time <= now, order.regime);
            if due {
                match regime {
                    Regime::Cancel | Regime::EmergencyClose => {
                        self.close_out(idx, &quote, now, &mut events)
                    }
                    Regime::Timeout => self.expire_before(idx, &quote, now, &mut events),
                    _ => self.evaluate(idx, &quote, now, &mut events),
                }
            }
            idx += 1;
        }

        if self.queue.compact() {
            debug!(
                live = self.queue.tail(),
                capacity = self.queue.capacity(),
                "Order queue compacted"
            );
        }
        events
    }

    fn evaluate(
        &mut self,
        idx: usize,
        quote: &Quote,
        now: Timestamp,
        events: &mut Vec<EngineEvent>,
    ) {
        let order = &self.queue[idx];
        let (order_id, regime) = (order.order_id, order.regime);

        match executor::evaluate(order, quote, self.account.base, now) {
            Evaluation::Fill(execution) => {
                let bracket = order.bracket(execution.quantity, now);
                if !self.apply_fill(order_id, regime, execution, events) {
                    self.queue.settle(idx, OrderState::Rejected);
                    return;
                }
                self.queue.settle(idx, OrderState::Filled);
                if let Some(bracket) = bracket {
                    debug!(
                        parent = %order_id,
                        order_id = %bracket.order_id,
                        regime = ?bracket.regime,
                        "Bracket queued"
                    );
                    self.counters.brackets += 1;
                    self.queue.push(bracket);
                }
            }
            Evaluation::Void => {
                debug!(%order_id, "Bracket cancelled, nothing left to close");
                self.queue.settle(idx, OrderState::Cancelled);
                self.counters.cancelled += 1;
            }
            Evaluation::Expired(execution) => {
                debug!(%order_id, "Order expired unfilled");
                self.queue.settle(idx, OrderState::Rejected);
                self.counters.rejections += 1;
                events.push(EngineEvent::Rejection {
                    order_id,
                    regime,
                    execution,
                });
            }
            Evaluation::Wait => {}
        }
    }

    /// Cancel or EmergencyClose: drop everything queued before it, then
    /// flatten the position at market.
    fn close_out(
        &mut self,
        idx: usize,
        quote: &Quote,
        now: Timestamp,
        events: &mut Vec<EngineEvent>,
    ) {
        let (order_id, regime) = (self.queue[idx].order_id, self.queue[idx].regime);
        let cancelled = self.queue.settle_before(idx, OrderState::Cancelled);
        self.counters.cancelled += cancelled.len() as u64;
        debug!(%order_id, ?regime, cancelled = cancelled.len(), "Closing out");

        let state = match executor::flatten(self.account.base, quote, now) {
            Some(execution) => {
                if self.apply_fill(order_id, regime, execution, events) {
                    OrderState::Filled
                } else {
                    OrderState::Rejected
                }
            }
            None if self.account.is_flat() => OrderState::Filled,
            None => {
                warn!(
                    %order_id,
                    bid = %quote.bid,
                    ask = %quote.ask,
                    "Quote spread out of range, position left open"
                );
                OrderState::Rejected
            }
        };
        self.queue.settle(idx, state);
    }

    /// Timeout: expire everything queued before it, reporting each
    /// directional order once.
    fn expire_before(
        &mut self,
        idx: usize,
        quote: &Quote,
        now: Timestamp,
        events: &mut Vec<EngineEvent>,
    ) {
        let expired = self.queue.settle_before(idx, OrderState::Expired);
        for order in expired.iter().filter(|o| o.regime.is_directional()) {
            self.counters.rejections += 1;
            events.push(EngineEvent::Rejection {
                order_id: order.order_id,
                regime: order.regime,
                execution: executor::expire(order, quote, now),
            });
        }
        debug!(expired = expired.len(), "Timeout applied");
        self.queue.settle(idx, OrderState::Filled);
    }

    /// Book a fill, or report it as a rejection when the account cannot
    /// absorb it. Returns whether the fill was booked.
    fn apply_fill(
        &mut self,
        order_id: OrderId,
        regime: Regime,
        execution: Execution,
        events: &mut Vec<EngineEvent>,
    ) -> bool {
        let booked = ledger::apply(
            &self.account,
            &execution,
            self.config.commission,
            self.config.quantum,
        );
        let Some(account) = booked else {
            warn!(
                %order_id,
                ?regime,
                price = %execution.price,
                quantity = %execution.quantity,
                "Fill overflows the account, rejected"
            );
            self.counters.rejections += 1;
            events.push(EngineEvent::Rejection {
                order_id,
                regime,
                execution: Execution::rejection(execution.time, execution.price),
            });
            return false;
        };
        self.account = account;
        self.counters.fills += 1;
        debug!(
            %order_id,
            ?regime,
            price = %execution.price,
            quantity = %execution.quantity,
            base = %self.account.base,
            "Order filled"
        );
        events.push(EngineEvent::Fill {
            order_id,
            regime,
            execution,
            account: self.account,
        });
        true
    }
}

/// Summary of a completed session
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub instrument: Option<String>,
    pub quotes: FeedStats,
    pub orders: FeedStats,
    pub counters: EngineCounters,
    /// Orders still pending at end of input
    pub pending: usize,
    pub account: Account,
    pub last_time: Timestamp,
}

/// Two-stream scheduler writing EXE/REJ/ACC lines to `out`
pub struct Session<Q, O, W> {
    engine: MatchingEngine,
    quotes: QuoteFeed<Q>,
    orders: OrderFeed<O>,
    out: W,
}

impl<Q: BufRead, O: BufRead, W: Write> Session<Q, O, W> {
    pub fn new(config: EngineConfig, quotes: Q, orders: O, out: W) -> Self {
        let mut quotes = QuoteFeed::new(quotes);
        let mut orders = OrderFeed::new(orders);
        if let Some(symbol) = &config.instrument {
            quotes.set_instrument(symbol);
            orders.set_instrument(symbol);
        }
        Self {
            engine: MatchingEngine::new(config),
            quotes,
            orders,
            out,
        }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Run both streams to exhaustion.
    pub fn run(mut self) -> Result<RunStats, EngineError> {
        // the order stream picks the instrument before any quote is read
        let mut next_order = self.orders.advance()?;
        if self.quotes.instrument().is_none() {
            if let Some(symbol) = self.orders.instrument() {
                self.quotes.set_instrument(symbol);
            }
        }
        let mut next_quote = self.quotes.advance()?;

        let symbol = self
            .orders
            .instrument()
            .or(self.quotes.instrument())
            .unwrap_or_default()
            .to_owned();
        info!(instrument = %symbol, "Session started");

        loop {
            let take_quote = match (&next_quote, &next_order) {
                (Some((quote_time, _)), Some(order)) => *quote_time <= order.time,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_quote {
                if let Some((time, quote)) = next_quote.take() {
                    self.engine.on_quote(quote);
                    self.engine.advance_clock(time);
                }
                next_quote = self.quotes.advance()?;
            } else {
                if let Some(instruction) = next_order.take() {
                    self.engine.admit(instruction);
                    self.engine.advance_clock(instruction.time);
                }
                next_order = self.orders.advance()?;
            }

            let events = self.engine.drain();
            write_events(&mut self.out, &symbol, &events, self.engine.config.track_spread)?;
        }
        self.out.flush()?;

        let stats = RunStats {
            instrument: (!symbol.is_empty()).then_some(symbol),
            quotes: self.quotes.stats(),
            orders: self.orders.stats(),
            counters: self.engine.counters(),
            pending: self.engine.queue().live_count(),
            account: *self.engine.account(),
            last_time: self.engine.metronome(),
        };
        info!(
            fills = stats.counters.fills,
            rejections = stats.counters.rejections,
            pending = stats.pending,
            base = %stats.account.base,
            "Session finished"
        );
        Ok(stats)
    }
}

fn write_events<W: Write>(
    out: &mut W,
    symbol: &str,
    events: &[EngineEvent],
    with_spread: bool,
) -> io::Result<()> {
    for event in events {
        let execution = event.execution();
        wire::write_execution(out, symbol, execution)?;
        if let Some(account) = event.account() {
            wire::write_account(out, execution.time, symbol, account, with_spread)?;
        }
    }
    Ok(())
}
