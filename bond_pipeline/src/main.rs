//! Bond pipeline binary.
//!
//! Generates the four synthetic feeds, builds and links every service, then
//! ingests prices, trades, market data and inquiries in that order. Stage
//! progress goes to stdout prefixed with a timestamp; diagnostics go through
//! `log` (`RUST_LOG` overrides the default `info` level).
//!
//! ```bash
//! bond_pipeline --data-dir ./run --gui-throttle-ms 300
//! ```
#![warn(missing_docs)]
mod args;

use std::time::Duration;

use bond_common::TradingError;
use bond_common::clock::timestamp;
use bond_common::generator::{FeedSizes, generate_feeds};
use bond_pipeline::{SystemConfig, TradingSystem};
use clap::Parser;
use log::{error, info};

use crate::args::Args;

fn main() -> Result<(), TradingError> {
    init_logger();
    let args = Args::parse();
    println!("---------------------- Program Start ----------------------");
    if let Err(e) = run(args) {
        error!("pipeline failed: {}", e);
        return Err(e);
    }
    println!("---------------------- Program End ----------------------");
    Ok(())
}

fn run(args: Args) -> Result<(), TradingError> {
    std::fs::create_dir_all(&args.data_dir)?;
    if args.skip_generate {
        info!("reusing feeds in {}", args.data_dir.display());
    } else {
        println!("{}Data generating...", timestamp());
        let counts = generate_feeds(&args.data_dir, &FeedSizes::default())?;
        info!("generated {:?}", counts);
        println!("{}Data generated successfully.", timestamp());
    }

    println!("{}Services initializing...", timestamp());
    let mut system = TradingSystem::new(SystemConfig {
        data_dir: args.data_dir.clone(),
        gui_throttle: Duration::from_millis(args.gui_throttle_ms),
        gui_max_updates: args.gui_max_updates,
    });
    println!("{}Services initialized successfully.", timestamp());

    println!("{}Services linking...", timestamp());
    system.link();
    println!("{}Services linked successfully.", timestamp());

    let mut current = None;
    let summary = system.run_with(|feed| {
        if let Some(done) = current.replace(feed) {
            println!("{}{} processed successfully.", timestamp(), done);
        }
        println!("{}{} processing...", timestamp(), feed);
    })?;
    if let Some(done) = current {
        println!("{}{} processed successfully.", timestamp(), done);
    }

    match serde_json::to_string(&summary) {
        Ok(json) => info!("run summary {}", json),
        Err(e) => error!("failed to render run summary: {}", e),
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
