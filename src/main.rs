use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use indicatif::{HumanBytes, HumanCount};
use log::{debug, error, info};

use sedu::signal::EXIT_CODE_INTERRUPTED;
use sedu::{Cli, Interrupted, ShutdownHandler, find_duplicates, format_human_elapsed, logging};

/// Usage text goes to stdout and the process exits with 1, before any scanning.
fn usage_error(message: &str) -> ExitCode {
    println!("{message}");
    println!("{}", Cli::command().render_usage());
    ExitCode::from(1)
}

fn resolve_root(path: &Path) -> Result<PathBuf, String> {
    let root = path
        .canonicalize()
        .map_err(|e| format!("error: cannot resolve '{}': {e}", path.display()))?;
    if !root.is_dir() {
        return Err(format!("error: '{}' is not a directory", root.display()));
    }
    Ok(root)
}

fn run(cli: &Cli, root: &Path) -> Result<()> {
    let shutdown = ShutdownHandler::install()?;
    let config = cli.scan_config(&shutdown);

    let outcome = find_duplicates(root, &config)?;
    if cli.json {
        sedu::print_json(&outcome.groups, outcome.files_hashed, &outcome.errors)?;
    } else {
        sedu::print_results(&outcome.groups, outcome.reclaimable_bytes);
    }
    info!(
        "Scanned {} directories: {} of {} files hashed ({})",
        HumanCount(outcome.dirs_visited as u64),
        HumanCount(outcome.files_hashed as u64),
        HumanCount(outcome.files_found as u64),
        HumanBytes(outcome.bytes_hashed)
    );
    if !outcome.errors.is_empty() {
        info!("{} files or directories could not be read", outcome.errors.len());
        for err in &outcome.errors {
            debug!("unreadable: '{}'", err.path().display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let start_time = Instant::now();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let reason = e.kind().as_str().unwrap_or("invalid arguments");
            return usage_error(&format!("error: {reason}"));
        }
    };

    logging::init_logging(cli.verbose, cli.quiet);
    info!("Starting sedu v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command line arguments: {:?}", cli);

    let root = match resolve_root(&cli.path) {
        Ok(root) => root,
        Err(message) => return usage_error(&message),
    };
    info!("Target directory: '{}'", root.display());

    match run(&cli, &root) {
        Ok(()) => {
            info!("Completed in {}", format_human_elapsed(start_time.elapsed()));
            ExitCode::SUCCESS
        }
        Err(e) if e.downcast_ref::<Interrupted>().is_some() => {
            error!("{e}; no results reported");
            ExitCode::from(EXIT_CODE_INTERRUPTED as u8)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
