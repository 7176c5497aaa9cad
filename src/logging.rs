use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use time::macros::format_description;

/// Level for the given `-v` count, or errors only when `quiet`.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Sends log records to stderr with local-time millisecond timestamps, so
/// stdout carries only the report.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_custom(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off);
    // Falls back to UTC when the local offset can't be determined safely.
    let _ = builder.set_time_offset_to_local();

    // Only fails if a logger is already installed.
    let _ = TermLogger::init(
        level_for(verbose, quiet),
        builder.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}
