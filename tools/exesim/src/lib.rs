//! Execution simulation tools
//!
//! Drivers around the matching engine: command line configuration, the
//! realized-PnL extractor used by `rpnl`, and the JSON run summary written
//! by `exesim --summary`.
//!
//! # Modules
//! - `config`: Command line arguments and their validation
//! - `pnl`: Realized PnL recovery from account snapshots
//! - `export`: Run summary JSON export
//! - `logging`: stderr tracing setup shared by the binaries

pub mod config;
pub mod pnl;
pub mod export;
pub mod logging;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
