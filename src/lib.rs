//! Highlight Reel Library
//!
//! Turns a long recorded talk, its transcript and a scored list of candidate ranges
//! into a short highlight video, with a hardware encoder when one is usable and a
//! software fallback when it is not.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use app::{FileOutcome, HighlightInteractor, HighlightJob};
pub use config::{ConfigOverrides, HighlightConfig};
pub use domain::model::{CandidateRange, Segment, TranscriptSegment};
pub use error::{HighlightError, HighlightResult};
