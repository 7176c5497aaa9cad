use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use colored::Colorize;
use indicatif::{HumanBytes, HumanCount};
use log::info;
use serde::Serialize;

use crate::error::ScanError;
use crate::hasher::{Digest, DigestResult};

/// Digest to every path that hashed to it, in arrival order.
pub type GroupMap = HashMap<Digest, Vec<PathBuf>>;

#[derive(Debug)]
struct Group {
    size: u64,
    paths: Vec<PathBuf>,
}

/// Groups hashed files by digest.
///
/// `record` may be called from any number of threads. The lock is held for a
/// single insert only.
#[derive(Debug, Default)]
pub struct Aggregator {
    groups: Mutex<HashMap<Digest, Group>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: DigestResult) {
        let DigestResult { digest, path, size } = result;
        let mut groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        groups
            .entry(digest)
            .or_insert_with(|| Group {
                size,
                paths: Vec::new(),
            })
            .paths
            .push(path);
    }

    /// Bytes that could be reclaimed by keeping one copy per group.
    pub fn reclaimable_bytes(&self) -> u64 {
        let groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        groups
            .values()
            .filter(|group| group.paths.len() > 1)
            .map(|group| group.size * (group.paths.len() - 1) as u64)
            .sum()
    }

    pub fn finalize(self) -> GroupMap {
        self.groups
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .into_iter()
            .map(|(digest, group)| (digest, group.paths))
            .collect()
    }
}

/// Groups with more than one member, paths sorted and groups ordered by their
/// first path so output is stable across runs.
pub fn duplicate_groups(groups: &GroupMap) -> Vec<(&Digest, Vec<&PathBuf>)> {
    let mut dups: Vec<_> = groups
        .iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(digest, paths)| {
            let mut paths: Vec<&PathBuf> = paths.iter().collect();
            paths.sort();
            (digest, paths)
        })
        .collect();
    dups.sort_by(|a, b| a.1[0].cmp(b.1[0]));
    dups
}

pub fn print_results(groups: &GroupMap, reclaimable: u64) {
    let dups = duplicate_groups(groups);
    if dups.is_empty() {
        info!("{}", "No duplicate files found!".green());
        return;
    }

    let total_duplicates: usize = dups.iter().map(|(_, paths)| paths.len() - 1).sum();
    info!(
        "Found {} duplicate files in {} groups wasting {}",
        HumanCount(total_duplicates as u64),
        HumanCount(dups.len() as u64),
        HumanBytes(reclaimable)
    );

    for (_digest, paths) in dups {
        println!("{}", "{".yellow());
        for path in paths {
            println!("  {}", path.display());
        }
        println!("{}", "}".yellow());
    }
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    digest: &'a str,
    paths: Vec<&'a PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    groups: Vec<JsonGroup<'a>>,
    files_hashed: usize,
    /// Paths that could not be listed or read.
    errors: Vec<&'a Path>,
}

pub fn print_json(
    groups: &GroupMap,
    files_hashed: usize,
    errors: &[ScanError],
) -> serde_json::Result<()> {
    let report = JsonReport {
        groups: duplicate_groups(groups)
            .into_iter()
            .map(|(digest, paths)| JsonGroup { digest, paths })
            .collect(),
        files_hashed,
        errors: errors.iter().map(ScanError::path).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
