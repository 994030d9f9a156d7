//! Types library for the synthetic execution toolkit
//!
//! This library provides the data model shared by the execution engine and
//! the accounting tools, plus the tab-separated record codec they speak.
//!
//! # Modules
//! - `ids`: Order ids and the instrument registry
//! - `numeric`: Fixed-point decimal types (Timestamp, Price, Quantity)
//! - `quote`: Best bid/ask snapshots
//! - `order`: Regimes, order lifecycle, order-feed instructions
//! - `execution`: Fill and rejection reports
//! - `account`: Position/cash account
//! - `fee`: Commission calculation
//! - `errors`: Error taxonomy
//! - `wire`: Line codec

// Public modules
pub mod ids;
pub mod numeric;
pub mod quote;
pub mod order;
pub mod execution;
pub mod account;
pub mod fee;
pub mod errors;
pub mod wire;
