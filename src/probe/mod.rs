//! Host capability probing

pub mod capability;

pub use capability::{CapabilityDecision, CapabilityDetector, CapabilityReason};
