//! Transcode execution engine
//!
//! Runs a compiled [`AssemblyPlan`](crate::planner::AssemblyPlan) through the external
//! transcoder, streams its diagnostics line by line, reports rate-limited progress and
//! applies the one-time hardware to software fallback.

pub mod executor;
pub mod fallback;
pub mod lines;
pub mod progress;

pub use executor::{AttemptRunner, AttemptState, ExecutionResult};
pub use fallback::{ExecutionEngine, ExecutionReport};
pub use lines::LineSplitter;
pub use progress::{
    ConsoleProgressCallback, JsonProgressCallback, NoOpProgressCallback, ProgressCallback,
    ProgressMonitor,
};

#[cfg(test)]
mod tests;
