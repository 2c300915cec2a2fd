//! Command-line arguments for the bond pipeline.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory that holds the input feeds and receives the sink logs.
    #[clap(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Minimum gap between GUI ticks, in milliseconds.
    #[clap(long, default_value_t = 300)]
    pub gui_throttle_ms: u64,

    /// Maximum number of GUI ticks published.
    #[clap(long, default_value_t = 100)]
    pub gui_max_updates: usize,

    /// Reuse the feed files already in the data directory.
    #[clap(long)]
    pub skip_generate: bool,
}
