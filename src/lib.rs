pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod pool;
pub mod scanner;
pub mod signal;
pub mod utils;

pub use cli::Cli;
pub use config::ScanConfig;
pub use duplicates::{Aggregator, GroupMap, duplicate_groups, print_json, print_results};
pub use error::{Interrupted, ScanError};
pub use hasher::{Digest, DigestResult, compute_digest};
pub use pool::{HashStats, ScanOutcome, find_duplicates, hash_files};
pub use scanner::{EntryKind, Listing, classify_entry, is_symlink, list_files};
pub use signal::ShutdownHandler;
pub use utils::format_human_elapsed;
