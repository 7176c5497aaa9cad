//! Ctrl+C handling.
//!
//! The handler only flips a shared flag. Hashing workers poll it between
//! files, so in-flight reads finish and the run is reported as interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::warn;

/// Exit status after an interrupted run (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the process-wide Ctrl+C handler. Can only succeed once per
    /// process.
    pub fn install() -> Result<Self> {
        let handler = Self::new();
        let flag = handler.flag();
        ctrlc::set_handler(move || {
            if !flag.swap(true, Ordering::SeqCst) {
                warn!("Interrupted, finishing files in progress...");
            }
        })
        .context("Failed to install Ctrl+C handler")?;
        Ok(handler)
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
