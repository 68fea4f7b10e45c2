use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::domain::model::Segment;
use crate::error::{HighlightError, HighlightResult};
use crate::planner::{AssemblyPlanner, Backend, Invocation, PlannerSettings};
use crate::ports::TranscodePort;

/// Transcoder fake that replays a script per call
struct ScriptedTranscoder {
    script: Mutex<Vec<HighlightResult<Option<i32>>>>,
    lines: Vec<&'static str>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedTranscoder {
    fn new(script: Vec<HighlightResult<Option<i32>>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            lines: vec![
                "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'talk.mp4':",
                "frame=  100 fps=50 q=23.0 size=1024kB time=00:00:30.00 bitrate=279.6kbits/s",
                "frame=  200 fps=50 q=23.0 size=2048kB time=00:01:00.00 bitrate=279.6kbits/s",
                "Conversion failed!",
            ],
            calls: Mutex::new(Vec::new()),
        })
    }

    fn backends(&self) -> Vec<Backend> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| {
                if call.args.iter().any(|a| a == "h264_nvenc") {
                    Backend::Hardware
                } else {
                    Backend::Software
                }
            })
            .collect()
    }
}

#[async_trait]
impl TranscodePort for ScriptedTranscoder {
    async fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> HighlightResult<Option<i32>> {
        self.calls.lock().unwrap().push(invocation.clone());
        for line in &self.lines {
            on_line(line);
        }
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(Some(0))
        } else {
            script.remove(0)
        }
    }
}

fn planner() -> AssemblyPlanner {
    AssemblyPlanner::new(PlannerSettings::default())
}

fn plan(backend: Backend) -> crate::planner::AssemblyPlan {
    let segments = vec![
        Segment::new(0.0, 60.0, "a", 9, "opening"),
        Segment::new(120.0, 180.0, "b", 8, "story"),
    ];
    planner()
        .plan_for_backend(Path::new("/talks/talk.mp4"), &segments, backend)
        .unwrap()
}

fn engine(transcoder: Arc<ScriptedTranscoder>, tail: usize) -> ExecutionEngine {
    ExecutionEngine::new(AttemptRunner::new(
        transcoder,
        Arc::new(NoOpProgressCallback),
        Duration::from_secs(2),
        tail,
    ))
}

#[tokio::test]
async fn test_hardware_success_single_attempt() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(0))]);
    let report = engine(transcoder.clone(), 50)
        .execute(plan(Backend::Hardware), &planner())
        .await;

    assert!(report.succeeded());
    assert!(!report.fallback_occurred);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.backend_used(), Backend::Hardware);
    assert_eq!(transcoder.backends(), vec![Backend::Hardware]);
}

#[tokio::test]
async fn test_hardware_failure_retries_once_with_software() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(1)), Ok(Some(0))]);
    let report = engine(transcoder.clone(), 50)
        .execute(plan(Backend::Hardware), &planner())
        .await;

    assert!(report.succeeded());
    assert!(report.fallback_occurred);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(report.attempts[0].backend, Backend::Hardware);
    assert!(!report.attempts[0].success);
    assert_eq!(report.attempts[0].exit_code, Some(1));
    assert_eq!(report.attempts[1].backend, Backend::Software);
    assert!(report.attempts.iter().all(|a| a.elapsed_seconds >= 0.0));
    assert_eq!(report.backend_used(), Backend::Software);
    assert_eq!(transcoder.backends(), vec![Backend::Hardware, Backend::Software]);

    let retry = &transcoder.calls.lock().unwrap()[1];
    assert!(!retry.args.iter().any(|a| a == "-hwaccel"));
}

#[tokio::test]
async fn test_both_attempts_fail_escalates_without_third_attempt() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(1)), Ok(Some(187)), Ok(Some(0))]);
    let report = engine(transcoder.clone(), 50)
        .execute(plan(Backend::Hardware), &planner())
        .await;

    assert!(!report.succeeded());
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(transcoder.backends(), vec![Backend::Hardware, Backend::Software]);

    match report.outcome() {
        Err(HighlightError::FatalProcessFailure {
            backend,
            exit_code,
            log_tail,
            invocation,
        }) => {
            assert_eq!(backend, Backend::Software);
            assert_eq!(exit_code, Some(187));
            assert!(log_tail.ends_with("Conversion failed!"));
            assert!(invocation.contains("libx264"));
        }
        other => panic!("expected process failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_software_failure_is_not_retried() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(1))]);
    let report = engine(transcoder.clone(), 50)
        .execute(plan(Backend::Software), &planner())
        .await;

    assert!(!report.succeeded());
    assert!(!report.fallback_occurred);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(transcoder.backends(), vec![Backend::Software]);
}

#[tokio::test]
async fn test_spawn_error_counts_as_failed_attempt() {
    let spawn_error = std::io::Error::new(std::io::ErrorKind::NotFound, "ffmpeg not found");
    let transcoder = ScriptedTranscoder::new(vec![Err(HighlightError::Io(spawn_error)), Ok(Some(0))]);
    let report = engine(transcoder, 50)
        .execute(plan(Backend::Hardware), &planner())
        .await;

    assert!(report.fallback_occurred);
    assert_eq!(report.attempts[0].exit_code, None);
    assert!(report.attempts[0]
        .log_tail
        .last()
        .unwrap()
        .contains("ffmpeg not found"));
    assert!(report.succeeded());
}

#[tokio::test]
async fn test_signal_exit_is_failure() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(None)]);
    let report = engine(transcoder, 50)
        .execute(plan(Backend::Software), &planner())
        .await;
    assert!(!report.succeeded());
    assert_eq!(report.attempts[0].exit_code, None);
}

#[tokio::test]
async fn test_log_tail_keeps_last_lines() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(1))]);
    let report = engine(transcoder, 2)
        .execute(plan(Backend::Software), &planner())
        .await;

    let tail = &report.attempts[0].log_tail;
    assert_eq!(tail.len(), 2);
    assert!(tail[0].contains("time=00:01:00.00"));
    assert_eq!(tail[1], "Conversion failed!");
}

#[derive(Default)]
struct CountingCallback {
    progress: Mutex<Vec<f64>>,
    completed: Mutex<u32>,
}

impl ProgressCallback for CountingCallback {
    fn on_start(&self, _operation: &str, _total_seconds: f64) {}
    fn on_progress(&self, percent: f64, _processed_seconds: f64) {
        self.progress.lock().unwrap().push(percent);
    }
    fn on_complete(&self, _message: &str) {
        *self.completed.lock().unwrap() += 1;
    }
    fn on_error(&self, _error: &str) {}
}

#[tokio::test]
async fn test_progress_is_rate_limited_per_attempt() {
    let transcoder = ScriptedTranscoder::new(vec![Ok(Some(0))]);
    let callback = Arc::new(CountingCallback::default());
    let runner = AttemptRunner::new(transcoder, callback.clone(), Duration::from_secs(2), 50);

    let result = runner.run(&plan(Backend::Software)).await;
    assert!(result.success);

    // Two markers arrive back to back; only the first passes the 2 s limiter
    let progress = callback.progress.lock().unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0], 25.0);
    assert_eq!(*callback.completed.lock().unwrap(), 1);
}
