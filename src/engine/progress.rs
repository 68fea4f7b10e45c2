//! Progress parsing, rate limiting and callbacks

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called when an attempt starts
    fn on_start(&self, operation: &str, total_seconds: f64);

    /// Called with a rate-limited percentage while the transcoder runs
    fn on_progress(&self, percent: f64, processed_seconds: f64);

    /// Called when the attempt succeeds
    fn on_complete(&self, message: &str);

    /// Called when the attempt fails
    fn on_error(&self, error: &str);
}

/// Extract the `time=HH:MM:SS.xx` value from a transcoder stats line.
///
/// Returns `None` for anything that is not a well-formed, non-negative marker.
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let (_, rest) = line.split_once("time=")?;
    let token = rest.split_whitespace().next()?;

    let mut parts = token.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Percentage of the planned duration, clamped to 0..=100
pub fn percent_of(processed_seconds: f64, total_seconds: f64) -> f64 {
    if total_seconds <= 0.0 {
        return 0.0;
    }
    (processed_seconds / total_seconds * 100.0).clamp(0.0, 100.0)
}

/// Turns raw transcoder lines into rate-limited progress updates
pub struct ProgressMonitor {
    total_seconds: f64,
    interval: Duration,
    last_emit: Option<Instant>,
    callback: Arc<dyn ProgressCallback>,
}

impl ProgressMonitor {
    pub fn new(total_seconds: f64, interval: Duration, callback: Arc<dyn ProgressCallback>) -> Self {
        Self {
            total_seconds,
            interval,
            last_emit: None,
            callback,
        }
    }

    /// Observe a line now
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        self.observe_at(line, Instant::now())
    }

    /// Observe a line at a given instant; returns the percentage if an update was emitted
    pub fn observe_at(&mut self, line: &str, now: Instant) -> Option<f64> {
        let processed = parse_progress_time(line)?;

        if let Some(last) = self.last_emit {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }

        let percent = percent_of(processed, self.total_seconds);
        self.last_emit = Some(now);
        self.callback.on_progress(percent, processed);
        Some(percent)
    }
}

/// Console progress callback for CLI usage
pub struct ConsoleProgressCallback {
    verbose: bool,
}

impl ConsoleProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, operation: &str, total_seconds: f64) {
        if self.verbose {
            eprintln!("Starting: {} ({:.1}s planned)", operation, total_seconds);
        }
    }

    fn on_progress(&self, percent: f64, processed_seconds: f64) {
        let bar_length = 20;
        let filled = ((percent / 100.0) * bar_length as f64) as usize;
        let bar = "#".repeat(filled.min(bar_length)) + &"-".repeat(bar_length - filled.min(bar_length));
        eprintln!("[{}] {:>5.1}% ({:.1}s)", bar, percent, processed_seconds);
    }

    fn on_complete(&self, message: &str) {
        if self.verbose {
            eprintln!("Completed: {}", message);
        }
    }

    fn on_error(&self, error: &str) {
        eprintln!("Error: {}", error);
    }
}

/// JSON-lines progress callback for structured output
pub struct JsonProgressCallback;

impl JsonProgressCallback {
    fn emit(event: serde_json::Value) {
        eprintln!("{}", event);
    }
}

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, operation: &str, total_seconds: f64) {
        Self::emit(serde_json::json!({
            "event": "start",
            "operation": operation,
            "total_seconds": total_seconds,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn on_progress(&self, percent: f64, processed_seconds: f64) {
        Self::emit(serde_json::json!({
            "event": "progress",
            "percent": (percent * 10.0).round() / 10.0,
            "processed_seconds": processed_seconds,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn on_complete(&self, message: &str) {
        Self::emit(serde_json::json!({
            "event": "complete",
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn on_error(&self, error: &str) {
        Self::emit(serde_json::json!({
            "event": "error",
            "error": error,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }
}

/// No-op progress callback for when progress tracking is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _operation: &str, _total_seconds: f64) {}
    fn on_progress(&self, _percent: f64, _processed_seconds: f64) {}
    fn on_complete(&self, _message: &str) {}
    fn on_error(&self, _error: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<f64>>,
    }

    impl ProgressCallback for Recorder {
        fn on_start(&self, _operation: &str, _total_seconds: f64) {}
        fn on_progress(&self, percent: f64, _processed_seconds: f64) {
            self.updates.lock().unwrap().push(percent);
        }
        fn on_complete(&self, _message: &str) {}
        fn on_error(&self, _error: &str) {}
    }

    const STATS: &str =
        "frame= 1234 fps= 60 q=23.0 size=   10240kB time=00:01:30.50 bitrate=1000.0kbits/s speed=2.0x";

    #[test]
    fn test_parse_progress_time() {
        assert_eq!(parse_progress_time(STATS), Some(90.5));
        assert_eq!(parse_progress_time("time=01:00:00.00"), Some(3600.0));
    }

    #[test]
    fn test_parse_progress_time_ignores_noise() {
        assert_eq!(parse_progress_time("Stream #0:0: Video: h264"), None);
        assert_eq!(parse_progress_time("size=N/A time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_time("time=-577014:32:22.77"), None);
        assert_eq!(parse_progress_time("time=00:12"), None);
        assert_eq!(parse_progress_time("time="), None);
    }

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(percent_of(50.0, 200.0), 25.0);
        assert_eq!(percent_of(250.0, 200.0), 100.0);
        assert_eq!(percent_of(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_monitor_rate_limits_updates() {
        let recorder = Arc::new(Recorder::default());
        let mut monitor = ProgressMonitor::new(180.0, Duration::from_secs(2), recorder.clone());
        let t0 = Instant::now();

        let first = monitor.observe_at(STATS, t0).unwrap();
        assert!((first - 90.5 / 180.0 * 100.0).abs() < 1e-9);
        assert_eq!(monitor.observe_at(STATS, t0 + Duration::from_millis(500)), None);
        assert_eq!(monitor.observe_at(STATS, t0 + Duration::from_millis(1999)), None);
        assert!(monitor.observe_at(STATS, t0 + Duration::from_secs(2)).is_some());
        assert_eq!(monitor.observe_at("no marker", t0 + Duration::from_secs(10)), None);

        assert_eq!(recorder.updates.lock().unwrap().len(), 2);
    }
}
