//! Accumulates run facts and produces the provenance document

use std::path::Path;
use std::time::Instant;

use crate::config::HighlightConfig;
use crate::domain::model::{total_duration, Segment, TimeSpec};
use crate::engine::ExecutionReport;
use crate::error::HighlightError;
use crate::output::{
    AttemptRecord, CapabilityRecord, Counts, ExecutionRecord, OutputInfo, OutputStats,
    PhaseTimings, ProvenanceDocument, RunStatus, SegmentRecord, SourceInfo, SummaryStats,
    PROVENANCE_VERSION,
};
use crate::probe::CapabilityDecision;
use crate::utils::time::round2;

/// Characters of segment text kept in the document
pub const TEXT_PREVIEW_CHARS: usize = 250;

/// First 250 characters, with an ellipsis when truncated
pub fn text_preview(text: &str) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(TEXT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Wall-clock timer for one phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    started: Instant,
}

impl PhaseTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Seconds since start, rounded to two decimals
    pub fn elapsed_seconds(&self) -> f64 {
        round2(self.started.elapsed().as_secs_f64())
    }
}

/// Builder for a [`ProvenanceDocument`]; whatever is known when the run ends is recorded
pub struct ProvenanceRecorder {
    timer: PhaseTimer,
    configuration: HighlightConfig,
    source: SourceInfo,
    segments: Vec<Segment>,
    capability: Option<CapabilityRecord>,
    execution: Option<ExecutionRecord>,
    output: Option<OutputInfo>,
    timings: PhaseTimings,
    counts: Counts,
}

impl ProvenanceRecorder {
    pub fn new(source_path: &Path, configuration: HighlightConfig) -> Self {
        Self {
            timer: PhaseTimer::start(),
            configuration,
            source: SourceInfo {
                path: source_path.display().to_string(),
                duration_seconds: None,
                size_bytes: None,
            },
            segments: Vec::new(),
            capability: None,
            execution: None,
            output: None,
            timings: PhaseTimings::default(),
            counts: Counts::default(),
        }
    }

    pub fn timings_mut(&mut self) -> &mut PhaseTimings {
        &mut self.timings
    }

    pub fn record_transcript(&mut self, segment_count: usize, source_duration: f64) {
        self.counts.transcript_segments = segment_count;
        self.source.duration_seconds = Some(source_duration);
    }

    pub fn record_candidates(&mut self, received: usize, valid: usize) {
        self.counts.candidates_received = received;
        self.counts.candidates_valid = valid;
    }

    pub fn record_segments(&mut self, segments: &[Segment]) {
        self.counts.final_segments = segments.len();
        self.segments = segments.to_vec();
    }

    pub fn record_capability(&mut self, decision: &CapabilityDecision) {
        self.capability = Some(CapabilityRecord {
            enabled: decision.enabled,
            hardware_present: decision.hardware_present,
            tool_supports_encoder: decision.tool_supports_encoder,
            user_enabled: decision.user_enabled,
            reason: decision.reason.to_string(),
        });
    }

    pub fn record_execution(&mut self, report: &ExecutionReport) {
        self.execution = Some(ExecutionRecord {
            backend_used: report.backend_used(),
            fallback_occurred: report.fallback_occurred,
            attempts: report
                .attempts
                .iter()
                .map(|attempt| AttemptRecord {
                    backend: attempt.backend,
                    success: attempt.success,
                    elapsed_seconds: round2(attempt.elapsed_seconds),
                    exit_code: attempt.exit_code,
                })
                .collect(),
        });
    }

    pub fn record_source_size(&mut self, size_bytes: u64) {
        self.source.size_bytes = Some(size_bytes);
    }

    pub fn record_output(&mut self, stats: &OutputStats) {
        self.source.size_bytes = Some(stats.source_size_bytes);

        let duration = total_duration(&self.segments);
        let compression_ratio = match self.source.duration_seconds {
            Some(source) if duration > 0.0 => source / duration,
            _ => 0.0,
        };
        let size_reduction_percent = if stats.source_size_bytes > 0 {
            (1.0 - stats.size_bytes as f64 / stats.source_size_bytes as f64) * 100.0
        } else {
            0.0
        };

        self.output = Some(OutputInfo {
            path: stats.path.display().to_string(),
            duration_seconds: duration,
            size_bytes: stats.size_bytes,
            compression_ratio,
            size_reduction_percent,
        });
    }

    fn summary(&self) -> Option<SummaryStats> {
        if self.segments.is_empty() {
            return None;
        }
        let count = self.segments.len();
        let duration = total_duration(&self.segments);
        let score_sum: u32 = self.segments.iter().map(|s| u32::from(s.score)).sum();

        Some(SummaryStats {
            total_segments: count,
            total_duration_seconds: duration,
            total_duration_formatted: TimeSpec::from_seconds(duration).format_mm_ss(),
            average_segment_duration: duration / count as f64,
            average_score: f64::from(score_sum) / count as f64,
        })
    }

    /// Close the record. `error` is the terminal failure, if any.
    pub fn finish(mut self, error: Option<&HighlightError>) -> ProvenanceDocument {
        self.timings.total = self.timer.elapsed_seconds();
        let summary = self.summary();

        let segments = self
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| SegmentRecord {
                index,
                start: segment.start,
                end: segment.end,
                duration: segment.duration(),
                start_formatted: segment.start_formatted(),
                end_formatted: segment.end_formatted(),
                score: segment.score,
                reason: segment.reason.clone(),
                text_preview: text_preview(&segment.text),
                full_text_length: segment.text.chars().count(),
            })
            .collect();

        ProvenanceDocument {
            version: PROVENANCE_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            status: if error.is_some() {
                RunStatus::Error
            } else {
                RunStatus::Success
            },
            error: error.map(|e| e.to_string()),
            source: self.source,
            output: self.output,
            segments,
            summary,
            capability: self.capability,
            execution: self.execution,
            timings: self.timings,
            counts: self.counts,
            configuration: self.configuration,
        }
    }
}
