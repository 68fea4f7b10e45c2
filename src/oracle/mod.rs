//! Scoring oracle boundary
//!
//! The oracle is an external service proposing important time ranges. This
//! module shapes the request handed to it and turns its untrusted response
//! into candidate ranges.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{SummaryContext, TimeSpec, TranscriptSegment};

pub mod parser;

pub use parser::{parse_response, strip_wrapping, EntryOutcome};

/// Everything the oracle needs to score a talk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Transcript rendered as `[MM:SS] text` units
    pub transcript: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// Length of the source in seconds
    pub total_duration: f64,
    /// Output budget in seconds
    pub max_duration: f64,
    /// Artifact directory of the file being processed; never sent to the oracle
    #[serde(skip)]
    pub artifacts_dir: Option<PathBuf>,
}

impl OracleRequest {
    pub fn new(
        segments: &[TranscriptSegment],
        context: &SummaryContext,
        total_duration: f64,
        max_duration: f64,
    ) -> Self {
        Self {
            transcript: render_transcript(segments),
            summary: context.summary.clone(),
            tags: context.tags.clone(),
            total_duration,
            max_duration,
            artifacts_dir: None,
        }
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }
}

/// Render transcript units with their start timestamps
pub fn render_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            format!(
                "[{}] {}",
                TimeSpec::from_seconds(segment.start).format_mm_ss(),
                segment.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let segments = vec![
            TranscriptSegment::new(0.0, 4.0, " Welcome."),
            TranscriptSegment::new(65.2, 70.0, "Open your Bibles. "),
        ];
        assert_eq!(
            render_transcript(&segments),
            "[00:00] Welcome. [01:05] Open your Bibles."
        );
    }

    #[test]
    fn test_request_carries_context() {
        let context = SummaryContext {
            summary: "A talk on grace".to_string(),
            tags: vec!["grace".to_string()],
        };
        let request = OracleRequest::new(&[], &context, 1800.0, 600.0);
        assert_eq!(request.summary, "A talk on grace");
        assert_eq!(request.tags, vec!["grace"]);
        assert_eq!(request.total_duration, 1800.0);
        assert_eq!(request.transcript, "");
    }
}
