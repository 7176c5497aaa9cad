use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::ScanError;

/// Lowercase hex BLAKE3 digest of a file's full content.
pub type Digest = String;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// One successfully hashed file, on its way from a worker to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResult {
    pub digest: Digest,
    pub path: PathBuf,
    /// Bytes streamed through the hasher.
    pub size: u64,
}

/// Streams the file at `path` through BLAKE3 in fixed-size chunks.
pub fn compute_digest(path: &Path) -> Result<DigestResult, ScanError> {
    let read_err = |source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_err)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_err(e)),
        };
        hasher.update(&buffer[..bytes_read]);
        size += bytes_read as u64;
    }

    let digest = hasher.finalize().to_hex().to_string();
    trace!("{} {} ({} bytes)", digest, path.display(), size);

    Ok(DigestResult {
        digest,
        path: path.to_path_buf(),
        size,
    })
}
