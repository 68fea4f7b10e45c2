//! Hardware encoder capability detection

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::planner::profile::HARDWARE_ENCODER;
use crate::ports::SystemProbePort;

/// Why hardware encoding is or is not enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityReason {
    DisabledByUser,
    NoHardwareDetected,
    ToolLacksSupport,
    Enabled,
}

impl fmt::Display for CapabilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CapabilityReason::DisabledByUser => "disabled by user",
            CapabilityReason::NoHardwareDetected => "no hardware detected",
            CapabilityReason::ToolLacksSupport => "tool lacks support",
            CapabilityReason::Enabled => "enabled",
        };
        f.write_str(text)
    }
}

/// Advisory backend decision handed to the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDecision {
    pub enabled: bool,
    pub hardware_present: bool,
    pub tool_supports_encoder: bool,
    pub user_enabled: bool,
    pub reason: CapabilityReason,
}

impl CapabilityDecision {
    /// Combine the three independent checks; all must pass
    pub fn from_checks(user_enabled: bool, hardware_present: bool, tool_supports_encoder: bool) -> Self {
        let reason = if !user_enabled {
            CapabilityReason::DisabledByUser
        } else if !hardware_present {
            CapabilityReason::NoHardwareDetected
        } else if !tool_supports_encoder {
            CapabilityReason::ToolLacksSupport
        } else {
            CapabilityReason::Enabled
        };

        Self {
            enabled: reason == CapabilityReason::Enabled,
            hardware_present,
            tool_supports_encoder,
            user_enabled,
            reason,
        }
    }
}

/// Probes the host and the transcoder for hardware encoding support
pub struct CapabilityDetector {
    probe: Arc<dyn SystemProbePort>,
}

impl CapabilityDetector {
    pub fn new(probe: Arc<dyn SystemProbePort>) -> Self {
        Self { probe }
    }

    /// Run both probes and decide
    pub async fn detect(&self, user_enabled: bool) -> CapabilityDecision {
        let (hardware_present, tool_supports_encoder) = tokio::join!(
            self.probe.hardware_present(),
            self.probe.encoder_supported(HARDWARE_ENCODER)
        );

        let decision =
            CapabilityDecision::from_checks(user_enabled, hardware_present, tool_supports_encoder);
        info!(
            "Hardware encoding {} (hardware present: {}, {} available: {}, requested: {})",
            decision.reason, hardware_present, HARDWARE_ENCODER, tool_supports_encoder, user_enabled
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FakeProbe {
        hardware: bool,
        encoders: Vec<&'static str>,
    }

    #[async_trait]
    impl SystemProbePort for FakeProbe {
        async fn hardware_present(&self) -> bool {
            self.hardware
        }

        async fn encoder_supported(&self, encoder: &str) -> bool {
            self.encoders.contains(&encoder)
        }
    }

    fn detector(hardware: bool, encoders: Vec<&'static str>) -> CapabilityDetector {
        CapabilityDetector::new(Arc::new(FakeProbe { hardware, encoders }))
    }

    #[tokio::test]
    async fn test_enabled_when_all_checks_pass() {
        let decision = detector(true, vec!["libx264", "h264_nvenc"]).detect(true).await;
        assert!(decision.enabled);
        assert_eq!(decision.reason, CapabilityReason::Enabled);
        assert_eq!(decision.reason.to_string(), "enabled");
    }

    #[tokio::test]
    async fn test_tool_lacks_support() {
        let decision = detector(true, vec!["libx264"]).detect(true).await;
        assert!(!decision.enabled);
        assert!(decision.hardware_present);
        assert!(!decision.tool_supports_encoder);
        assert_eq!(decision.reason.to_string(), "tool lacks support");
    }

    #[tokio::test]
    async fn test_no_hardware() {
        let decision = detector(false, vec!["h264_nvenc"]).detect(true).await;
        assert!(!decision.enabled);
        assert_eq!(decision.reason, CapabilityReason::NoHardwareDetected);
    }

    #[tokio::test]
    async fn test_user_disable_wins_but_probes_still_recorded() {
        let decision = detector(true, vec!["h264_nvenc"]).detect(false).await;
        assert!(!decision.enabled);
        assert_eq!(decision.reason.to_string(), "disabled by user");
        assert!(decision.hardware_present);
        assert!(decision.tool_supports_encoder);
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&CapabilityReason::ToolLacksSupport).unwrap();
        assert_eq!(json, "\"tool_lacks_support\"");
    }
}
