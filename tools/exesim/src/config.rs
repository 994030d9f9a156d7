//! Command line configuration
//!
//! The clap structs are the only place flags are named; they convert into
//! the plain configuration structs the engine and the extractor take.

use std::path::PathBuf;

use clap::Parser;
use matching_engine::sizing::SizingPolicy;
use matching_engine::EngineConfig;
use rust_decimal::Decimal;
use types::fee::CommissionRate;
use types::numeric::Quantity;

use crate::pnl::PnlConfig;

/// Largest scale a decimal can carry
const MAX_DP: i64 = 28;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("--timeout must not be negative, got {0}")]
    NegativeTimeout(Decimal),
}

/// Replay an order stream against a quote stream and report fills
#[derive(Debug, Parser)]
#[command(name = "exesim", version)]
pub struct ExesimArgs {
    /// Quote file: <ts> <instrument> <bid> <ask>
    pub quotes: PathBuf,

    /// Order file; standard input when omitted
    pub orders: Option<PathBuf>,

    /// Delay before an order is first evaluated, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub exe_delay: u64,

    /// Commission per traded unit, in price units
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub commission: Decimal,

    /// Unit order quantity
    #[arg(long, default_value_t = Decimal::ONE)]
    pub quantity: Decimal,

    /// Size orders against the position so that they flip it
    #[arg(long)]
    pub absqty: bool,

    /// Refuse orders adding to a position that already holds one unit
    #[arg(long)]
    pub maxqty: bool,

    /// Good-till window of orders, in seconds
    #[arg(long)]
    pub timeout: Option<Decimal>,

    /// Instrument to simulate; defaults to the first one in the order stream
    #[arg(long)]
    pub instrument: Option<String>,

    /// Decimal places of account base and term
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=MAX_DP))]
    pub quantum: u32,

    /// Track spread cost as an extra ACC column
    #[arg(long)]
    pub spread: bool,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl ExesimArgs {
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveQuantity(self.quantity));
        }
        if let Some(timeout) = self.timeout {
            if timeout < Decimal::ZERO {
                return Err(ConfigError::NegativeTimeout(timeout));
            }
        }
        Ok(EngineConfig {
            exe_delay: Decimal::from(self.exe_delay) / Decimal::from(1000),
            timeout: self.timeout,
            commission: CommissionRate::new(self.commission),
            sizing: SizingPolicy {
                unit: Quantity::new(self.quantity),
                max_qty: self.maxqty,
                abs_qty: self.absqty,
            },
            quantum: self.quantum,
            instrument: self.instrument.clone(),
            track_spread: self.spread,
        })
    }
}

/// Recover realized PnL from ACC lines
#[derive(Debug, Parser)]
#[command(name = "rpnl", version)]
pub struct RpnlArgs {
    /// Account snapshot file; standard input when omitted
    pub accounts: Option<PathBuf>,

    /// Add realized commission and spread columns
    #[arg(long)]
    pub breakdown: bool,

    /// Decimal places of the emitted values
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(0..=MAX_DP))]
    pub precision: u32,
}

impl RpnlArgs {
    pub fn pnl_config(&self) -> PnlConfig {
        PnlConfig {
            precision: self.precision,
            breakdown: self.breakdown,
        }
    }
}
