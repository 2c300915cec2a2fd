//! Command-line arguments for the feed generator.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory the four feed files are written to.
    #[clap(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Price rows per security.
    #[clap(long, default_value_t = 1000)]
    pub prices: usize,

    /// Trades per security.
    #[clap(long, default_value_t = 10)]
    pub trades: usize,

    /// Market data ticks per security; each tick is a BID and an OFFER row.
    #[clap(long, default_value_t = 10000)]
    pub ticks: usize,

    /// Inquiries per security.
    #[clap(long, default_value_t = 10)]
    pub inquiries: usize,
}
