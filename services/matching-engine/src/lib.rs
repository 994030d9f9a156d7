//! Synthetic Execution Engine
//!
//! Replays a time-ordered order stream against a time-ordered best bid/ask
//! stream, fills orders against the quote in force, and keeps a running
//! position/cash account.
//!
//! **Key Invariants:**
//! - Long fills at the ask, Short fills at the bid, never through the limit
//! - Orders are evaluated in queue order against one quote per tick
//! - Every expired order is reported exactly once
//! - Account base and term change only through applied executions

pub mod feed;
pub mod queue;
pub mod sizing;
pub mod matching;
pub mod ledger;
pub mod engine;
pub mod events;

pub use engine::{EngineConfig, EngineError, MatchingEngine, RunStats, Session};
pub use events::EngineEvent;
