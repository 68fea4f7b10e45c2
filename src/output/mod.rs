//! Provenance document, its recorder, atomic writer and output verification

use serde::{Deserialize, Serialize};

use crate::config::HighlightConfig;
use crate::planner::Backend;

pub mod recorder;
pub mod verifier;
pub mod writer;

pub use recorder::{text_preview, PhaseTimer, ProvenanceRecorder};
pub use verifier::{verify_output, OutputStats};
pub use writer::{read_json, read_provenance, write_json_atomic, write_provenance};

/// Schema version of the provenance document
pub const PROVENANCE_VERSION: &str = "2.0";

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// Durable record of one run, written once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceDocument {
    pub version: String,
    /// RFC 3339
    pub generated_at: String,
    pub status: RunStatus,
    pub error: Option<String>,
    pub source: SourceInfo,
    pub output: Option<OutputInfo>,
    pub segments: Vec<SegmentRecord>,
    pub summary: Option<SummaryStats>,
    pub capability: Option<CapabilityRecord>,
    pub execution: Option<ExecutionRecord>,
    pub timings: PhaseTimings,
    pub counts: Counts,
    pub configuration: HighlightConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: String,
    /// End of the last transcript segment
    pub duration_seconds: Option<f64>,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub path: String,
    pub duration_seconds: f64,
    pub size_bytes: u64,
    /// Source duration over output duration
    pub compression_ratio: f64,
    pub size_reduction_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub start_formatted: String,
    pub end_formatted: String,
    pub score: u8,
    pub reason: String,
    pub text_preview: String,
    /// In characters
    pub full_text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_segments: usize,
    pub total_duration_seconds: f64,
    pub total_duration_formatted: String,
    pub average_segment_duration: f64,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub enabled: bool,
    pub hardware_present: bool,
    pub tool_supports_encoder: bool,
    pub user_enabled: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub backend_used: Backend,
    pub fallback_occurred: bool,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub backend: Backend,
    pub success: bool,
    pub elapsed_seconds: f64,
    pub exit_code: Option<i32>,
}

/// Seconds spent per phase; execution time lives on each attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub oracle: f64,
    pub validation: f64,
    pub optimization: f64,
    pub planning: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub transcript_segments: usize,
    pub candidates_received: usize,
    pub candidates_valid: usize,
    pub final_segments: usize,
}
