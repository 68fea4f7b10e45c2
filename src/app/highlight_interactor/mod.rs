// Highlight interactor - Orchestrates the per-file highlight use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::app::artifacts::{check_source_video, load_summary, load_transcript, source_duration};
use crate::config::HighlightConfig;
use crate::domain::model::{total_duration, Segment, SummaryContext, TranscriptSegment};
use crate::domain::rules::{RangeValidator, SegmentOptimizer};
use crate::engine::ExecutionEngine;
use crate::error::HighlightResult;
use crate::oracle::{parse_response, OracleRequest};
use crate::output::{
    verify_output, write_provenance, PhaseTimer, ProvenanceRecorder, RunStatus,
};
use crate::planner::{AssemblyPlan, AssemblyPlanner};
use crate::ports::ScoringOracle;
use crate::probe::{CapabilityDecision, CapabilityDetector};
use crate::utils::path::{derive_output_path, file_stem, metadata_path_for};

/// File name of the transcript inside an artifact directory
pub const TRANSCRIPT_FILE_NAME: &str = "transcription_segments.json";
/// File name of the summary inside an artifact directory
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Inputs for one highlight run
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightJob {
    pub video_path: PathBuf,
    pub transcript_path: PathBuf,
    pub summary_path: PathBuf,
    /// Where a recorded oracle response may be found
    pub artifacts_dir: Option<PathBuf>,
}

impl HighlightJob {
    /// Job whose artifacts live in `<artifacts_root>/<video stem>/`
    pub fn from_artifacts_root(video_path: &Path, artifacts_root: &Path) -> HighlightResult<Self> {
        let dir = artifacts_root.join(file_stem(video_path)?);
        Ok(Self::from_artifacts_dir(video_path, &dir))
    }

    /// Job whose artifacts live directly in `dir`
    pub fn from_artifacts_dir(video_path: &Path, dir: &Path) -> Self {
        Self {
            video_path: video_path.to_path_buf(),
            transcript_path: dir.join(TRANSCRIPT_FILE_NAME),
            summary_path: dir.join(SUMMARY_FILE_NAME),
            artifacts_dir: Some(dir.to_path_buf()),
        }
    }
}

/// Structured per-file result; failures never escape the file boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub status: RunStatus,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Everything decided before the transcoder runs
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub transcript: Vec<TranscriptSegment>,
    pub summary: SummaryContext,
    pub segments: Vec<Segment>,
    pub decision: CapabilityDecision,
    pub plan: AssemblyPlan,
}

/// Interactor for the highlight use case
pub struct HighlightInteractor {
    config: HighlightConfig,
    oracle: Arc<dyn ScoringOracle>,
    detector: CapabilityDetector,
    planner: AssemblyPlanner,
    engine: ExecutionEngine,
}

impl HighlightInteractor {
    pub fn new(
        config: HighlightConfig,
        oracle: Arc<dyn ScoringOracle>,
        detector: CapabilityDetector,
        engine: ExecutionEngine,
    ) -> Self {
        let planner = AssemblyPlanner::new(config.planner_settings());
        Self {
            config,
            oracle,
            detector,
            planner,
            engine,
        }
    }

    /// Where the provenance document for a source ends up
    pub fn metadata_path(&self, video_path: &Path) -> HighlightResult<PathBuf> {
        let output = derive_output_path(video_path, self.config.output_dir.as_deref())?;
        metadata_path_for(&output)
    }

    /// Process one file end to end. Always writes a provenance document when a
    /// location for it can be derived, and never returns an error.
    pub async fn process(&self, job: &HighlightJob) -> FileOutcome {
        let filename = job
            .video_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| job.video_path.display().to_string());
        info!("Processing {}", job.video_path.display());

        let mut recorder = ProvenanceRecorder::new(&job.video_path, self.config.clone());
        let result = self.run(job, &mut recorder).await;
        let document = recorder.finish(result.as_ref().err());

        let metadata_path = match self.metadata_path(&job.video_path) {
            Ok(path) => match write_provenance(&path, &document) {
                Ok(()) => Some(path.display().to_string()),
                Err(e) => {
                    error!("Could not write provenance to {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                error!("No provenance location for {}: {}", job.video_path.display(), e);
                None
            }
        };

        match result {
            Ok(segments) => {
                let output_path = document.output.as_ref().map(|o| o.path.clone());
                FileOutcome {
                    status: RunStatus::Success,
                    filename,
                    output_path,
                    metadata_path,
                    duration_seconds: Some(total_duration(&segments)),
                    segment_count: Some(segments.len()),
                    error: None,
                }
            }
            Err(e) => {
                error!("{} failed: {}", filename, e);
                FileOutcome {
                    status: RunStatus::Error,
                    filename,
                    output_path: None,
                    metadata_path,
                    duration_seconds: None,
                    segment_count: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Run everything up to and including planning, without touching the transcoder
    pub async fn prepare(
        &self,
        job: &HighlightJob,
        recorder: &mut ProvenanceRecorder,
    ) -> HighlightResult<PreparedRun> {
        check_source_video(&job.video_path)?;
        if let Ok(meta) = std::fs::metadata(&job.video_path) {
            recorder.record_source_size(meta.len());
        }
        let transcript = load_transcript(&job.transcript_path)?;
        let summary = load_summary(&job.summary_path)?;
        let total = source_duration(&transcript);
        recorder.record_transcript(transcript.len(), total);

        let timer = PhaseTimer::start();
        let mut request = OracleRequest::new(&transcript, &summary, total, self.config.max_duration);
        if let Some(dir) = &job.artifacts_dir {
            request = request.with_artifacts_dir(dir);
        }
        info!("Requesting highlights from oracle '{}'", self.oracle.name());
        let raw = self.oracle.propose(&request).await;
        recorder.timings_mut().oracle = timer.elapsed_seconds();
        let outcomes = parse_response(&raw?)?;

        let timer = PhaseTimer::start();
        let candidates: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).cloned().collect();
        let report = RangeValidator::new(&transcript, total).validate(&candidates);
        recorder.record_candidates(outcomes.len(), report.segments.len());
        recorder.timings_mut().validation = timer.elapsed_seconds();
        if report.discarded > 0 || report.clamped > 0 {
            warn!(
                "{} candidates discarded, {} clamped to the source bounds",
                report.discarded, report.clamped
            );
        }

        let timer = PhaseTimer::start();
        let optimizer = SegmentOptimizer::new(self.config.optimizer_settings(Some(total)));
        let optimized = optimizer.optimize(report.segments);
        recorder.timings_mut().optimization = timer.elapsed_seconds();
        let segments = optimized?;
        recorder.record_segments(&segments);

        let decision = self.detector.detect(self.config.hardware_enabled).await;
        recorder.record_capability(&decision);

        let timer = PhaseTimer::start();
        let plan = self.planner.plan(&job.video_path, &segments, &decision);
        recorder.timings_mut().planning = timer.elapsed_seconds();

        Ok(PreparedRun {
            transcript,
            summary,
            segments,
            decision,
            plan: plan?,
        })
    }

    /// Prepare without recording anything, for `--dry-run`
    pub async fn dry_run(&self, job: &HighlightJob) -> HighlightResult<PreparedRun> {
        let mut recorder = ProvenanceRecorder::new(&job.video_path, self.config.clone());
        self.prepare(job, &mut recorder).await
    }

    async fn run(
        &self,
        job: &HighlightJob,
        recorder: &mut ProvenanceRecorder,
    ) -> HighlightResult<Vec<Segment>> {
        let prepared = self.prepare(job, recorder).await?;

        if let Some(dir) = prepared.plan.output_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let report = self.engine.execute(prepared.plan, &self.planner).await;
        recorder.record_execution(&report);
        report.outcome()?;

        let stats = verify_output(&report.final_plan.output_path, &job.video_path)?;
        recorder.record_output(&stats);

        if report.fallback_occurred {
            warn!("Highlight produced by the software encoder after a hardware failure");
        }
        Ok(prepared.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_from_artifacts_root() {
        let job =
            HighlightJob::from_artifacts_root(Path::new("/videos/sunday.mp4"), Path::new("/artifacts"))
                .unwrap();
        assert_eq!(
            job.transcript_path,
            PathBuf::from("/artifacts/sunday/transcription_segments.json")
        );
        assert_eq!(job.summary_path, PathBuf::from("/artifacts/sunday/summary.json"));
        assert_eq!(job.artifacts_dir, Some(PathBuf::from("/artifacts/sunday")));
    }

    #[test]
    fn test_outcome_serialization_skips_empty_fields() {
        let outcome = FileOutcome {
            status: RunStatus::Error,
            filename: "a.mp4".to_string(),
            output_path: None,
            metadata_path: None,
            duration_seconds: None,
            segment_count: None,
            error: Some("Missing transcript: /x".to_string()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("output_path").is_none());
        assert_eq!(json["error"], "Missing transcript: /x");
    }
}
