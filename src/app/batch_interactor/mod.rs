// Batch interactor - Runs the highlight use case over a directory of videos

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::app::highlight_interactor::{FileOutcome, HighlightInteractor, HighlightJob};
use crate::error::{HighlightError, HighlightResult};
use crate::output::{read_json, read_provenance, write_json_atomic, RunStatus};
use crate::utils::path::{file_stem, is_highlight_output, is_video_file};

/// Default name of the per-batch results file
pub const RESULTS_FILE_NAME: &str = "batch_summaries.json";

/// Outcomes keyed by file stem
pub type BatchResults = BTreeMap<String, FileOutcome>;

/// Inputs for one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    /// Holds one `<stem>/` directory of artifacts per video
    pub artifacts_root: PathBuf,
    pub results_path: PathBuf,
    /// Skip files whose provenance document already says success
    pub resume: bool,
}

/// Totals of one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results_path: String,
}

impl BatchReport {
    fn count(&mut self, outcome: &FileOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Video files directly inside `dir`, sorted by name. Highlights written next
/// to their sources are not sources themselves.
pub fn discover_videos(dir: &Path) -> HighlightResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(HighlightError::missing("input directory", dir.display().to_string()));
    }

    let mut videos = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| HighlightError::Io(e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_video_file(path) && !is_highlight_output(path) {
            videos.push(entry.into_path());
        }
    }
    Ok(videos)
}

/// Read a results file; an absent one is empty
pub fn load_results(path: &Path) -> HighlightResult<BatchResults> {
    if !path.exists() {
        return Ok(BatchResults::new());
    }
    read_json(path)
}

/// Interactor for batch and retry runs
pub struct BatchInteractor {
    highlight: Arc<HighlightInteractor>,
}

impl BatchInteractor {
    pub fn new(highlight: Arc<HighlightInteractor>) -> Self {
        Self { highlight }
    }

    /// Process every video in the input directory, one at a time
    pub async fn run(&self, request: &BatchRequest) -> HighlightResult<BatchReport> {
        let videos = discover_videos(&request.input_dir)?;
        info!("Found {} video files in {}", videos.len(), request.input_dir.display());

        let mut results = load_results(&request.results_path)?;
        let mut report = BatchReport {
            total: videos.len(),
            results_path: request.results_path.display().to_string(),
            ..BatchReport::default()
        };

        for (index, video) in videos.iter().enumerate() {
            let stem = file_stem(video)?;
            if request.resume && self.already_succeeded(video) {
                info!("[{}/{}] {} already done, skipping", index + 1, videos.len(), stem);
                report.skipped += 1;
                continue;
            }

            info!("[{}/{}] {}", index + 1, videos.len(), stem);
            let outcome = self.process_one(video, &request.artifacts_root).await;
            report.count(&outcome);
            results.insert(stem, outcome);
            write_json_atomic(&request.results_path, &results)?;
        }

        info!(
            "Batch finished: {} succeeded, {} failed, {} skipped",
            report.succeeded, report.failed, report.skipped
        );
        Ok(report)
    }

    /// Re-run only the entries of a results file whose status is error
    pub async fn retry_failed(
        &self,
        results_path: &Path,
        input_dir: &Path,
        artifacts_root: &Path,
    ) -> HighlightResult<BatchReport> {
        if !results_path.is_file() {
            return Err(HighlightError::missing(
                "batch results",
                results_path.display().to_string(),
            ));
        }
        let mut results = load_results(results_path)?;
        let failed: Vec<(String, String)> = results
            .iter()
            .filter(|(_, outcome)| outcome.status == RunStatus::Error)
            .map(|(stem, outcome)| (stem.clone(), outcome.filename.clone()))
            .collect();

        let mut report = BatchReport {
            results_path: results_path.display().to_string(),
            ..BatchReport::default()
        };
        if failed.is_empty() {
            info!("No failed files in {}", results_path.display());
            return Ok(report);
        }
        info!("Retrying {} failed files", failed.len());

        for (stem, filename) in failed {
            let video = input_dir.join(&filename);
            if !video.is_file() {
                warn!("File not found, leaving its entry as is: {}", video.display());
                report.skipped += 1;
                continue;
            }
            report.total += 1;
            let outcome = self.process_one(&video, artifacts_root).await;
            report.count(&outcome);
            results.insert(stem, outcome);
            write_json_atomic(results_path, &results)?;
        }

        info!(
            "Retry finished: {} now succeeded, {} still failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }

    async fn process_one(&self, video: &Path, artifacts_root: &Path) -> FileOutcome {
        match HighlightJob::from_artifacts_root(video, artifacts_root) {
            Ok(job) => self.highlight.process(&job).await,
            Err(e) => FileOutcome {
                status: RunStatus::Error,
                filename: video.display().to_string(),
                output_path: None,
                metadata_path: None,
                duration_seconds: None,
                segment_count: None,
                error: Some(e.to_string()),
            },
        }
    }

    fn already_succeeded(&self, video: &Path) -> bool {
        self.highlight
            .metadata_path(video)
            .ok()
            .filter(|path| path.is_file())
            .and_then(|path| read_provenance(&path).ok())
            .map(|doc| doc.status == RunStatus::Success)
            .unwrap_or(false)
    }
}
