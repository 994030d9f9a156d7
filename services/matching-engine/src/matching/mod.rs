//! Matching logic module
//!
//! Orders never rest against each other: each pending order is matched
//! against the best bid/ask in force, in queue order.

pub mod crossing;
pub mod executor;

pub use crossing::fill_price;
pub use executor::Evaluation;
