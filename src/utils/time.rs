//! Time formatting helpers

use std::time::Duration;

/// Format seconds for a filter argument: millisecond precision, no trailing zeros
pub fn format_seconds_arg(seconds: f64) -> String {
    let text = format!("{:.3}", seconds);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Format a duration for logs, e.g. `01:02.500` or `01:00:00.000`
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
    }
}

/// Seconds rounded to two decimals, as recorded in timing reports
pub fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
