//! Feed generator: writes `prices.txt`, `trades.txt`, `marketdata.txt` and
//! `inquiries.txt` without running the pipeline.
//!
//! ```bash
//! bond_feedgen --out-dir ./run --ticks 500
//! ```
#![warn(missing_docs)]
mod args;

use bond_common::TradingError;
use bond_common::generator::{FeedSizes, generate_feeds};
use clap::Parser;
use log::{error, info};

use crate::args::Args;

fn main() -> Result<(), TradingError> {
    init_logger();
    let args = Args::parse();
    let sizes = FeedSizes {
        prices: args.prices,
        trades: args.trades,
        ticks: args.ticks,
        inquiries: args.inquiries,
    };
    if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
        error!("cannot create {}: {}", args.out_dir.display(), e);
        return Err(e.into());
    }
    match generate_feeds(&args.out_dir, &sizes) {
        Ok(counts) => {
            info!(
                "wrote {} prices, {} trades, {} market data rows, {} inquiries to {}",
                counts.prices,
                counts.trades,
                counts.market_data,
                counts.inquiries,
                args.out_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("feed generation failed: {}", e);
            Err(e)
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
