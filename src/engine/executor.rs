//! Single transcode attempt

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::progress::{ProgressCallback, ProgressMonitor};
use crate::error::HighlightError;
use crate::planner::{AssemblyPlan, Backend};
use crate::ports::TranscodePort;
use crate::utils::time::format_duration;

/// Lifecycle of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Starting,
    Running,
    Succeeded,
    Failed,
}

impl AttemptState {
    fn advance(self, next: AttemptState) -> AttemptState {
        debug!("Attempt {:?} -> {:?}", self, next);
        next
    }
}

/// Outcome of one transcode attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub backend: Backend,
    pub success: bool,
    pub elapsed_seconds: f64,
    pub exit_code: Option<i32>,
    /// Last diagnostic lines, oldest first
    pub log_tail: Vec<String>,
    /// Shell-quoted command line, for reproducing the attempt by hand
    pub invocation: String,
}

impl ExecutionResult {
    /// Convert a failed attempt into the fatal error it represents
    pub fn to_failure(&self) -> HighlightError {
        HighlightError::FatalProcessFailure {
            backend: self.backend,
            exit_code: self.exit_code,
            log_tail: self.log_tail.join("\n"),
            invocation: self.invocation.clone(),
        }
    }
}

/// Drives one plan through the transcoder and observes its progress
pub struct AttemptRunner {
    transcoder: Arc<dyn TranscodePort>,
    progress: Arc<dyn ProgressCallback>,
    progress_interval: Duration,
    log_tail_lines: usize,
}

impl AttemptRunner {
    pub fn new(
        transcoder: Arc<dyn TranscodePort>,
        progress: Arc<dyn ProgressCallback>,
        progress_interval: Duration,
        log_tail_lines: usize,
    ) -> Self {
        Self {
            transcoder,
            progress,
            progress_interval,
            log_tail_lines: log_tail_lines.max(1),
        }
    }

    /// Run one attempt. Always yields exactly one result, even if the process never starts.
    pub async fn run(&self, plan: &AssemblyPlan) -> ExecutionResult {
        let backend = plan.backend();
        let invocation = plan.invocation();
        let command_line = invocation.to_shell_string();
        let total = plan.planned_duration();

        let mut state = AttemptState::Starting;
        info!("Starting {} encode ({:.1}s planned) -> {}", backend, total, plan.output_path.display());
        debug!("Invocation: {}", command_line);
        self.progress.on_start(&format!("{} encode", backend), total);

        let started = Instant::now();
        let mut monitor = ProgressMonitor::new(total, self.progress_interval, self.progress.clone());
        let mut tail: VecDeque<String> = VecDeque::with_capacity(self.log_tail_lines);
        let capacity = self.log_tail_lines;

        state = state.advance(AttemptState::Running);
        let outcome = {
            let mut on_line = |line: &str| {
                monitor.observe(line);
                if tail.len() == capacity {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            };
            self.transcoder.run(&invocation, &mut on_line).await
        };
        let elapsed = started.elapsed();
        let elapsed_seconds = elapsed.as_secs_f64();

        let (success, exit_code) = match outcome {
            Ok(code) => (code == Some(0), code),
            Err(e) => {
                warn!("{} encode could not run: {}", backend, e);
                if tail.len() == capacity {
                    tail.pop_front();
                }
                tail.push_back(e.to_string());
                (false, None)
            }
        };

        if success {
            state = state.advance(AttemptState::Succeeded);
            info!("{} encode finished in {}", backend, format_duration(elapsed));
            self.progress.on_complete(&format!("{} encode finished", backend));
        } else {
            state = state.advance(AttemptState::Failed);
            warn!(
                "{} encode failed after {:.1}s (exit code {:?})",
                backend, elapsed_seconds, exit_code
            );
            self.progress.on_error(&format!("{} encode failed", backend));
        }
        debug_assert!(matches!(state, AttemptState::Succeeded | AttemptState::Failed));

        ExecutionResult {
            backend,
            success,
            elapsed_seconds,
            exit_code,
            log_tail: tail.into_iter().collect(),
            invocation: command_line,
        }
    }
}
