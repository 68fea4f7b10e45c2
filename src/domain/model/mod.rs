// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HighlightError, HighlightResult};

#[cfg(test)]
mod tests;

/// Time specification - represents a point in the source media in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse an oracle timestamp.
    ///
    /// Accepts `MM:SS` and `HH:MM:SS`, where the last component may carry a
    /// fractional part. Minutes are not bounded in the two-part form so that
    /// `75:30` denotes an hour and a quarter. Any other shape is rejected.
    pub fn parse(time_str: &str) -> HighlightResult<Self> {
        let trimmed = time_str.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();

        let invalid = || {
            HighlightError::validation(format!(
                "invalid timestamp '{}', expected MM:SS or HH:MM:SS",
                trimmed
            ))
        };

        let whole = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());
        let fractional = |part: &str| {
            let value = part.trim().parse::<f64>().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid());
            }
            Ok(value)
        };

        let seconds = match parts.as_slice() {
            [minutes, seconds] => whole(minutes)? as f64 * 60.0 + fractional(seconds)?,
            [hours, minutes, seconds] => {
                whole(hours)? as f64 * 3600.0 + whole(minutes)? as f64 * 60.0 + fractional(seconds)?
            }
            _ => return Err(invalid()),
        };

        Ok(Self::from_seconds(seconds))
    }

    /// Format as zero-padded `MM:SS`, truncating fractional seconds
    pub fn format_mm_ss(&self) -> String {
        let total = self.seconds.max(0.0) as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Format as `H:MM:SS` when at least an hour long, `M:SS` otherwise
    pub fn format_hms(&self) -> String {
        let total = self.seconds.max(0.0) as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_mm_ss())
    }
}

/// One unit of speech produced by the transcription service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Interval overlap with `[start, end)`
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end > start
    }
}

/// Time range proposed by the scoring oracle.
///
/// Timestamps stay textual until the range validator parses them; nothing
/// about a candidate is trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRange {
    pub start_time: String,
    pub end_time: String,
    pub score: u8,
    #[serde(default)]
    pub reason: String,
}

/// Validated working unit of the source media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub score: u8,
    pub reason: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>, score: u8, reason: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            score,
            reason: reason.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn start_formatted(&self) -> String {
        TimeSpec::from_seconds(self.start).format_mm_ss()
    }

    pub fn end_formatted(&self) -> String {
        TimeSpec::from_seconds(self.end).format_mm_ss()
    }
}

/// Sum of segment durations
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments.iter().map(Segment::duration).sum()
}

/// Contextual summary produced upstream of clip generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryContext {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
