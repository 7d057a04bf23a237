use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "browsing-insights",
    about = "Turn a browser history export into aggregated browsing statistics",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to a browser history CSV export
    #[arg(required_unless_present = "init")]
    pub input: Option<PathBuf>,

    /// Number of top domains to display
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,

    /// Number of hidden gems (single-visit domains) to display
    #[arg(short, long, default_value_t = 5)]
    pub gems: usize,

    /// Path to custom category rule file
    #[arg(short, long)]
    pub categories: Option<PathBuf>,

    /// Path to custom video title rule file
    #[arg(long)]
    pub video_rules: Option<PathBuf>,

    /// Emit the full snapshot as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Show the day-by-day activity breakdown
    #[arg(short, long)]
    pub daily: bool,

    /// List records that were excluded from some aggregate
    #[arg(long)]
    pub show_excluded: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Initialize category_rules.txt and video_rules.txt with defaults
    #[arg(long)]
    pub init: bool,
}
