// Domain rules - Segment selection policies

pub mod optimizer;
pub mod validator;

pub use optimizer::{OptimizerSettings, SegmentOptimizer};
pub use validator::{RangeValidator, ValidatedRange, ValidationReport};
