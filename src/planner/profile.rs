//! Encoder profiles for the hardware and software backends

use serde::{Deserialize, Serialize};

use crate::planner::Backend;

/// NVIDIA encoder used by the hardware backend
pub const HARDWARE_ENCODER: &str = "h264_nvenc";
/// CPU encoder used by the software backend
pub const SOFTWARE_ENCODER: &str = "libx264";

/// Chosen transcoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeProfile {
    pub backend: Backend,
    pub encoder: String,
    /// `p1`..`p7` for hardware, x264 speed preset for software
    pub preset: String,
    /// Constant quality (hardware) or constant rate factor (software)
    pub quality: u8,
    /// CUDA device used for decoding, hardware only
    pub device_index: Option<u32>,
}

impl EncodeProfile {
    /// Constant-quality NVENC profile with hardware decoding
    pub fn hardware(preset: impl Into<String>, quality: u8, device_index: u32) -> Self {
        Self {
            backend: Backend::Hardware,
            encoder: HARDWARE_ENCODER.to_string(),
            preset: preset.into(),
            quality: quality.min(51),
            device_index: Some(device_index),
        }
    }

    /// Constant-rate-factor x264 profile
    pub fn software(preset: impl Into<String>, quality: u8) -> Self {
        Self {
            backend: Backend::Software,
            encoder: SOFTWARE_ENCODER.to_string(),
            preset: preset.into(),
            quality: quality.min(51),
            device_index: None,
        }
    }

    /// Arguments placed before the input
    pub fn input_args(&self) -> Vec<String> {
        match self.backend {
            // Frames come back to system memory for trim/fade, so no hwaccel_output_format
            Backend::Hardware => vec![
                "-hwaccel".to_string(),
                "cuda".to_string(),
                "-hwaccel_device".to_string(),
                self.device_index.unwrap_or(0).to_string(),
            ],
            Backend::Software => Vec::new(),
        }
    }

    /// Video encoder arguments
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.encoder.clone(),
            "-preset".to_string(),
            self.preset.clone(),
        ];

        match self.backend {
            Backend::Hardware => args.extend([
                "-cq".to_string(),
                self.quality.to_string(),
                "-b:v".to_string(),
                "0".to_string(),
                "-rc".to_string(),
                "vbr".to_string(),
            ]),
            Backend::Software => args.extend(["-crf".to_string(), self.quality.to_string()]),
        }

        args
    }
}
