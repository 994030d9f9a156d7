//! Run summary export
//!
//! Serializes the engine configuration and the session statistics to JSON
//! for external consumption.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use matching_engine::{EngineConfig, RunStats};
use serde::Serialize;

/// Everything `exesim --summary` writes
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub version: String,
    pub config: EngineConfig,
    pub stats: RunStats,
}

pub fn build_summary(config: &EngineConfig, stats: &RunStats) -> RunSummary {
    RunSummary {
        version: crate::VERSION.to_string(),
        config: config.clone(),
        stats: stats.clone(),
    }
}

/// Write the summary to `path`, replacing any existing file.
pub fn write_to_file(summary: &RunSummary, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}
