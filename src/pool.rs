use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;
use indicatif::{HumanBytes, HumanCount, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};

use crate::config::ScanConfig;
use crate::duplicates::{Aggregator, GroupMap};
use crate::error::{Interrupted, ScanError};
use crate::hasher::{DigestResult, compute_digest};
use crate::scanner::list_files;

/// Counters from one pass of the worker pool.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HashStats {
    pub attempted: usize,
    pub hashed: usize,
    pub bytes: u64,
}

/// Everything a finished scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    pub groups: GroupMap,
    pub files_found: usize,
    pub files_hashed: usize,
    pub dirs_visited: usize,
    pub bytes_hashed: u64,
    pub reclaimable_bytes: u64,
    pub errors: Vec<ScanError>,
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Hashes every path on a pool of `config.worker_count()` workers and records
/// each success in `aggregator`.
///
/// Paths are queued up front; each worker pulls until the queue is empty or a
/// shutdown is requested. The calling thread drains results into the
/// aggregator until every worker has dropped its sender. Per-file failures are
/// logged and pushed onto `errors`. A requested shutdown stops dispatch and
/// yields an [`Interrupted`] error.
pub fn hash_files(
    paths: Vec<PathBuf>,
    config: &ScanConfig,
    aggregator: &Aggregator,
    errors: &mut Vec<ScanError>,
) -> Result<HashStats> {
    let total = paths.len();
    let workers = config.worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hash-worker-{i}"))
        .build()
        .context("Failed to build hashing thread pool")?;

    info!("Hashing {} files with {} workers", HumanCount(total as u64), workers);

    let (path_tx, path_rx) = unbounded::<PathBuf>();
    let (result_tx, result_rx) = unbounded::<DigestResult>();
    for path in paths {
        // The receiver is alive for the whole function.
        let _ = path_tx.send(path);
    }
    drop(path_tx);

    let pb = progress_bar(total, config.show_progress);
    let attempted = AtomicUsize::new(0);
    let failures = Mutex::new(Vec::new());
    let mut stats = HashStats::default();

    pool.in_place_scope(|scope| {
        for _ in 0..workers {
            let path_rx = path_rx.clone();
            let result_tx = result_tx.clone();
            let (attempted, failures, pb) = (&attempted, &failures, &pb);
            scope.spawn(move |_| {
                while !config.is_shutdown_requested() {
                    let Ok(path) = path_rx.recv() else { break };
                    match compute_digest(&path) {
                        Ok(result) => {
                            // Only fails if the collector is gone, and it outlives the scope.
                            let _ = result_tx.send(result);
                        }
                        Err(err) => {
                            pb.suspend(|| warn!("{err}"));
                            failures.lock().unwrap_or_else(|e| e.into_inner()).push(err);
                        }
                    }
                    attempted.fetch_add(1, Ordering::Relaxed);
                    pb.inc(1);
                }
            });
        }
        // Workers hold the only remaining senders; the loop below ends once
        // all of them have exited.
        drop(result_tx);

        for result in result_rx.iter() {
            stats.hashed += 1;
            stats.bytes += result.size;
            aggregator.record(result);
        }
    });

    pb.finish_and_clear();
    errors.extend(failures.into_inner().unwrap_or_else(|e| e.into_inner()));
    stats.attempted = attempted.into_inner();

    if config.is_shutdown_requested() && stats.attempted < total {
        return Err(Interrupted {
            attempted: stats.attempted,
            total,
        }
        .into());
    }

    debug!("Hashed {} of {} files", stats.hashed, stats.attempted);
    Ok(stats)
}

/// Walks `root`, hashes every file found and groups them by digest.
///
/// Returns an error if the run was interrupted; no partial grouping is ever
/// handed back.
pub fn find_duplicates(root: &Path, config: &ScanConfig) -> Result<ScanOutcome> {
    let listing = list_files(root);
    let files_found = listing.files.len();
    let mut errors = listing.errors;

    let aggregator = Aggregator::new();
    let stats = hash_files(listing.files, config, &aggregator, &mut errors)?;

    let reclaimable_bytes = aggregator.reclaimable_bytes();
    let groups = aggregator.finalize();
    info!(
        "Hashed {} files ({}), {} distinct, {} errors",
        HumanCount(stats.hashed as u64),
        HumanBytes(stats.bytes),
        HumanCount(groups.len() as u64),
        errors.len()
    );

    Ok(ScanOutcome {
        groups,
        files_found,
        files_hashed: stats.hashed,
        dirs_visited: listing.dirs_visited,
        bytes_hashed: stats.bytes,
        reclaimable_bytes,
        errors,
    })
}
