use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::ScanConfig;
use crate::signal::ShutdownHandler;

#[derive(Parser, Debug)]
#[command(name = "sedu", version)]
#[command(about = "Find duplicate files in a directory tree by content")]
pub struct Cli {
    /// Directory to scan for duplicates
    pub path: PathBuf,

    /// Number of parallel hashing workers (default: number of CPU cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Print duplicate groups as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Don't draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn scan_config(&self, shutdown: &ShutdownHandler) -> ScanConfig {
        ScanConfig {
            threads: self.threads,
            show_progress: !self.no_progress && !self.quiet,
            shutdown: shutdown.flag(),
        }
    }
}
