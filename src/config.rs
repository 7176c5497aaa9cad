use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Settings for one scan, built from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Fixed number of hashing workers; `None` means one per available core.
    pub threads: Option<usize>,
    /// Draw a progress bar on stderr while hashing.
    pub show_progress: bool,
    /// Set from the Ctrl+C handler to stop dispatching new files.
    pub shutdown: Arc<AtomicBool>,
}

impl ScanConfig {
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: Some(threads),
            ..Self::default()
        }
    }

    /// Resolved worker count, never less than one.
    pub fn worker_count(&self) -> usize {
        let n = self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        n.max(1)
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
