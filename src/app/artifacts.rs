//! Loading of the per-file input artifacts

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::model::{SummaryContext, TranscriptSegment};
use crate::error::{HighlightError, HighlightResult};
use crate::utils::path::is_video_file;

/// Transcript artifact: either a bare array or wrapped in `segments`
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Bare(Vec<TranscriptSegment>),
    Wrapped { segments: Vec<TranscriptSegment> },
}

fn read_artifact(what: &str, path: &Path) -> HighlightResult<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(HighlightError::missing(what, path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Load transcript units; an absent or empty transcript is a missing artifact
pub fn load_transcript(path: &Path) -> HighlightResult<Vec<TranscriptSegment>> {
    let content = read_artifact("transcript", path)?;
    let segments = match serde_json::from_str::<TranscriptFile>(&content)? {
        TranscriptFile::Bare(segments) | TranscriptFile::Wrapped { segments } => segments,
    };

    if segments.is_empty() {
        return Err(HighlightError::missing(
            "transcript segments",
            path.display().to_string(),
        ));
    }

    info!("Loaded {} transcript segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// Load the contextual summary and tags
pub fn load_summary(path: &Path) -> HighlightResult<SummaryContext> {
    let content = read_artifact("summary", path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Source duration as covered by the transcript: the end of its last unit
pub fn source_duration(segments: &[TranscriptSegment]) -> f64 {
    segments.iter().map(|s| s.end).fold(0.0, f64::max)
}

/// The source must exist and look like a video
pub fn check_source_video(path: &Path) -> HighlightResult<()> {
    if !path.is_file() {
        return Err(HighlightError::missing("source video", path.display().to_string()));
    }
    if !is_video_file(path) {
        return Err(HighlightError::validation(format!(
            "{} is not a supported video file",
            path.display()
        )));
    }
    Ok(())
}
