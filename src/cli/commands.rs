//! Command implementations
//!
//! Every command prints one JSON document on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::{AppContainer, FileOutcome, HighlightJob, PreparedRun};
use crate::app::batch_interactor::BatchRequest;
use crate::app::highlight_interactor::{SUMMARY_FILE_NAME, TRANSCRIPT_FILE_NAME};
use crate::cli::args::{BatchArgs, GenerateArgs, RetryArgs};
use crate::domain::model::Segment;
use crate::output::RunStatus;
use crate::planner::Backend;
use crate::probe::CapabilityDecision;
use crate::utils::path::file_stem;

/// What `generate --dry-run` prints
#[derive(Debug, Serialize)]
pub struct DryRunReport {
    pub source: String,
    pub output: String,
    pub backend: Backend,
    pub planned_duration: f64,
    pub segments: Vec<Segment>,
    pub capability: CapabilityDecision,
    pub invocation: String,
}

impl From<&PreparedRun> for DryRunReport {
    fn from(prepared: &PreparedRun) -> Self {
        Self {
            source: prepared.plan.source_path.display().to_string(),
            output: prepared.plan.output_path.display().to_string(),
            backend: prepared.plan.backend(),
            planned_duration: prepared.plan.planned_duration(),
            segments: prepared.segments.clone(),
            capability: prepared.decision.clone(),
            invocation: prepared.plan.invocation().to_shell_string(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve the job for one source from the generate flags
pub fn job_from_args(args: &GenerateArgs) -> Result<HighlightJob> {
    let artifacts = match &args.artifacts {
        Some(dir) => dir.clone(),
        None => {
            let parent = args.input.parent().unwrap_or_else(|| Path::new(""));
            parent.join(file_stem(&args.input)?)
        }
    };
    let mut job = HighlightJob::from_artifacts_dir(&args.input, &artifacts);
    if let Some(transcript) = &args.transcript {
        job.transcript_path = transcript.clone();
    }
    if let Some(summary) = &args.summary {
        job.summary_path = summary.clone();
    }
    info!(
        "Artifacts: {} ({} / {})",
        artifacts.display(),
        TRANSCRIPT_FILE_NAME,
        SUMMARY_FILE_NAME
    );
    Ok(job)
}

/// Execute the generate command. Returns whether the run succeeded.
pub async fn generate(container: &dyn AppContainer, args: GenerateArgs) -> Result<bool> {
    let job = job_from_args(&args)?;
    let interactor = container.highlight_interactor();

    if args.dry_run {
        return match interactor.dry_run(&job).await {
            Ok(prepared) => {
                print_json(&DryRunReport::from(&prepared))?;
                Ok(true)
            }
            Err(e) => {
                print_json(&FileOutcome {
                    status: RunStatus::Error,
                    filename: job.video_path.display().to_string(),
                    output_path: None,
                    metadata_path: None,
                    duration_seconds: None,
                    segment_count: None,
                    error: Some(e.to_string()),
                })?;
                Ok(false)
            }
        };
    }

    let outcome = interactor.process(&job).await;
    print_json(&outcome)?;
    Ok(outcome.is_success())
}

fn artifacts_root(input_dir: &Path, artifacts: &Option<PathBuf>) -> PathBuf {
    artifacts.clone().unwrap_or_else(|| input_dir.to_path_buf())
}

/// Execute the batch command
pub async fn batch(container: &dyn AppContainer, args: BatchArgs) -> Result<bool> {
    let request = BatchRequest {
        artifacts_root: artifacts_root(&args.input_dir, &args.artifacts),
        input_dir: args.input_dir,
        results_path: args.results,
        resume: args.resume,
    };
    let report = container
        .batch_interactor()
        .run(&request)
        .await
        .context("Batch run failed")?;
    print_json(&report)?;
    Ok(report.failed == 0)
}

/// Execute the retry-failed command
pub async fn retry_failed(container: &dyn AppContainer, args: RetryArgs) -> Result<bool> {
    let root = artifacts_root(&args.input_dir, &args.artifacts);
    let report = container
        .batch_interactor()
        .retry_failed(&args.results, &args.input_dir, &root)
        .await
        .context("Retry failed")?;
    print_json(&report)?;
    Ok(report.failed == 0)
}

/// Execute the detect command
pub async fn detect(container: &dyn AppContainer, user_enabled: bool) -> Result<bool> {
    let decision = container.capability_detector().detect(user_enabled).await;
    print_json(&decision)?;
    Ok(true)
}
