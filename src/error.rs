use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A recoverable failure on a single directory or file.
///
/// None of these abort a run: the affected subtree or file is left out of the
/// result and the error is kept on the [`ScanOutcome`](crate::ScanOutcome).
#[derive(Debug, Error)]
pub enum ScanError {
    /// A directory could not be listed, or one of its entries could not be read.
    #[error("read_dir: '{}': {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    /// Entry metadata could not be determined; the entry is skipped.
    #[error("metadata: '{}': {source}", path.display())]
    Metadata { path: PathBuf, source: io::Error },

    /// A file could not be opened or fully read while hashing.
    #[error("hash: '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

impl ScanError {
    pub fn path(&self) -> &Path {
        match self {
            Self::ReadDir { path, .. } | Self::Metadata { path, .. } | Self::Read { path, .. } => {
                path
            }
        }
    }
}

/// Returned when a run is cancelled before every path was attempted.
#[derive(Debug, Error)]
#[error("interrupted after {attempted} of {total} files")]
pub struct Interrupted {
    pub attempted: usize,
    pub total: usize,
}
