//! exesim - execution simulator
//!
//! Reads quotes from a file and orders from a file or stdin, writes EXE, REJ
//! and ACC lines to stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};

use anyhow::Context;
use clap::Parser;
use exesim::config::ExesimArgs;
use exesim::{export, logging};
use matching_engine::Session;

fn main() -> anyhow::Result<()> {
    let args = ExesimArgs::parse();
    logging::init();

    let config = args.engine_config()?;

    let quotes = File::open(&args.quotes)
        .with_context(|| format!("cannot open quote file {}", args.quotes.display()))?;
    let orders: Box<dyn BufRead> = match &args.orders {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open order file {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let out = BufWriter::new(io::stdout().lock());

    tracing::info!(quotes = %args.quotes.display(), "Starting execution simulator");
    let stats = Session::new(config.clone(), BufReader::new(quotes), orders, out)
        .run()
        .context("simulation aborted")?;

    if let Some(path) = &args.summary {
        let summary = export::build_summary(&config, &stats);
        export::write_to_file(&summary, path)
            .with_context(|| format!("cannot write summary {}", path.display()))?;
    }
    Ok(())
}
