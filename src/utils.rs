use std::time::Duration;

/// Formats a run time as `s.mmm seconds`, `m:ss.mmm` or `h:mm:ss.mmm`.
pub fn format_human_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

    match (hours, minutes) {
        (0, 0) => format!("{seconds}.{millis:03} seconds"),
        (0, _) => format!("{minutes}:{seconds:02}.{millis:03} (m:ss.mmm)"),
        _ => format!("{hours}:{minutes:02}:{seconds:02}.{millis:03} (h:mm:ss.mmm)"),
    }
}
