//! Range validation for oracle-proposed candidates

use tracing::{debug, info, warn};

use crate::domain::model::{CandidateRange, Segment, TimeSpec, TranscriptSegment};
use crate::error::{HighlightError, HighlightResult};

/// A candidate that survived validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRange {
    pub segment: Segment,
    /// Bounds were pulled into `[0, total_duration]`
    pub clamped: bool,
}

/// Outcome of validating a whole candidate batch
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Surviving segments in candidate order, not yet sorted or merged
    pub segments: Vec<Segment>,
    pub discarded: usize,
    pub clamped: usize,
}

/// Parses, bounds-checks and annotates candidate ranges against a transcript
pub struct RangeValidator<'a> {
    transcript: &'a [TranscriptSegment],
    total_duration: f64,
}

impl<'a> RangeValidator<'a> {
    /// Create a validator over a transcript covering `[0, total_duration]`
    pub fn new(transcript: &'a [TranscriptSegment], total_duration: f64) -> Self {
        Self {
            transcript,
            total_duration,
        }
    }

    /// Validate every candidate, skipping the malformed ones
    pub fn validate(&self, candidates: &[CandidateRange]) -> ValidationReport {
        info!(
            "Validating {} candidate ranges against {:.1}s of transcript",
            candidates.len(),
            self.total_duration
        );

        let mut report = ValidationReport::default();

        for (index, candidate) in candidates.iter().enumerate() {
            match self.validate_candidate(candidate) {
                Ok(validated) => {
                    if validated.clamped {
                        report.clamped += 1;
                    }
                    debug!(
                        "Range {}: {} - {} ({:.0}s) - {}",
                        index + 1,
                        validated.segment.start_formatted(),
                        validated.segment.end_formatted(),
                        validated.segment.duration(),
                        validated.segment.reason
                    );
                    report.segments.push(validated.segment);
                }
                Err(e) => {
                    warn!("Skipping candidate {}: {}", index + 1, e);
                    report.discarded += 1;
                }
            }
        }

        info!(
            "Validated {} ranges ({} discarded, {} clamped)",
            report.segments.len(),
            report.discarded,
            report.clamped
        );

        report
    }

    /// Validate a single candidate.
    ///
    /// Inverted ranges are rejected before clamping; out-of-bounds ranges are
    /// clamped and kept unless nothing of them lies inside the source.
    pub fn validate_candidate(&self, candidate: &CandidateRange) -> HighlightResult<ValidatedRange> {
        let start = TimeSpec::parse(&candidate.start_time)?.seconds;
        let end = TimeSpec::parse(&candidate.end_time)?.seconds;

        if start >= end {
            return Err(HighlightError::validation(format!(
                "inverted range {} - {} (start >= end)",
                candidate.start_time, candidate.end_time
            )));
        }

        let clamped_start = start.clamp(0.0, self.total_duration.max(0.0));
        let clamped_end = end.clamp(0.0, self.total_duration.max(0.0));
        let clamped = clamped_start != start || clamped_end != end;

        if clamped {
            warn!(
                "Range {} - {} exceeds source bounds, clamping to {:.1}s - {:.1}s",
                candidate.start_time, candidate.end_time, clamped_start, clamped_end
            );
        }

        if clamped_start >= clamped_end {
            return Err(HighlightError::validation(format!(
                "range {} - {} lies outside the {:.1}s source",
                candidate.start_time, candidate.end_time, self.total_duration
            )));
        }

        let text = self.text_between(clamped_start, clamped_end);

        Ok(ValidatedRange {
            segment: Segment::new(
                clamped_start,
                clamped_end,
                text,
                candidate.score,
                candidate.reason.clone(),
            ),
            clamped,
        })
    }

    /// Concatenate the text of every transcript unit overlapping `[start, end)`
    pub fn text_between(&self, start: f64, end: f64) -> String {
        let mut overlapping: Vec<&TranscriptSegment> = self
            .transcript
            .iter()
            .filter(|segment| segment.overlaps(start, end))
            .collect();
        overlapping.sort_by(|a, b| a.start.total_cmp(&b.start));

        overlapping
            .iter()
            .map(|segment| segment.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
