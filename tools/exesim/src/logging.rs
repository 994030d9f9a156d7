//! Tracing setup for the binaries
//!
//! stdout carries protocol lines only, so every diagnostic goes to stderr.
//! The filter comes from `RUST_LOG` and defaults to warnings.

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
