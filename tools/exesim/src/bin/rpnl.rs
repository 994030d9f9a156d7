//! rpnl - realized PnL from account snapshots
//!
//! Reads ACC lines from a file or stdin and writes one RPL line per interval
//! in which the position moved.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};

use anyhow::Context;
use clap::Parser;
use exesim::config::RpnlArgs;
use exesim::logging;
use exesim::pnl::PnlExtractor;

fn main() -> anyhow::Result<()> {
    let args = RpnlArgs::parse();
    logging::init();

    let input: Box<dyn BufRead> = match &args.accounts {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open account file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let out = BufWriter::new(io::stdout().lock());

    PnlExtractor::new(args.pnl_config())
        .run(input, out)
        .context("realized PnL extraction aborted")?;
    Ok(())
}
