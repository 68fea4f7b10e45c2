//! Run configuration and its layering: defaults < file < environment < CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::toml_config::read_config_file;
use crate::domain::rules::OptimizerSettings;
use crate::error::{HighlightError, HighlightResult};
use crate::planner::PlannerSettings;

/// Every option recognised by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Output budget in seconds
    pub max_duration: f64,
    pub min_segment_length: f64,
    pub context_padding: f64,
    pub merge_gap_threshold: f64,
    pub fade_enabled: bool,
    pub fade_duration: f64,
    pub hardware_enabled: bool,
    /// NVENC preset, `p1` (fastest) to `p7` (best)
    pub hardware_preset: String,
    pub hardware_device: u32,
    /// Defaults to the source video's directory
    pub output_dir: Option<PathBuf>,
    /// `-cq` for hardware, `-crf` for software
    pub quality: u8,
    pub software_preset: String,
    pub audio_bitrate: String,
    pub ffmpeg_path: String,
    pub progress_interval_seconds: f64,
    pub log_tail_lines: usize,
    /// External oracle command; a recorded response file is used when unset
    pub oracle_command: Option<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            max_duration: 600.0,
            min_segment_length: 30.0,
            context_padding: 5.0,
            merge_gap_threshold: 15.0,
            fade_enabled: true,
            fade_duration: 0.5,
            hardware_enabled: true,
            hardware_preset: "p6".to_string(),
            hardware_device: 0,
            output_dir: None,
            quality: 23,
            software_preset: "medium".to_string(),
            audio_bitrate: "192k".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            progress_interval_seconds: 2.0,
            log_tail_lines: 50,
            oracle_command: None,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub max_duration: Option<f64>,
    pub min_segment_length: Option<f64>,
    pub context_padding: Option<f64>,
    pub merge_gap_threshold: Option<f64>,
    pub fade_enabled: Option<bool>,
    pub fade_duration: Option<f64>,
    pub hardware_enabled: Option<bool>,
    pub hardware_preset: Option<String>,
    pub hardware_device: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub quality: Option<u8>,
    pub ffmpeg_path: Option<String>,
    pub oracle_command: Option<String>,
}

/// Environment variable names, as deployed
pub mod env_keys {
    pub const MAX_CLIP_DURATION: &str = "MAX_CLIP_DURATION";
    pub const MIN_SEGMENT_LENGTH: &str = "MIN_SEGMENT_LENGTH";
    pub const CONTEXT_PADDING: &str = "CONTEXT_PADDING";
    pub const MERGE_GAP_THRESHOLD: &str = "MERGE_GAP_THRESHOLD";
    pub const ENABLE_FADE_TRANSITIONS: &str = "ENABLE_FADE_TRANSITIONS";
    pub const FADE_DURATION: &str = "FADE_DURATION";
    pub const ENABLE_GPU_ENCODING: &str = "ENABLE_GPU_ENCODING";
    pub const GPU_ENCODER_PRESET: &str = "GPU_ENCODER_PRESET";
    pub const GPU_DEVICE_INDEX: &str = "GPU_DEVICE_INDEX";
    pub const CLIP_OUTPUT_DIR: &str = "CLIP_OUTPUT_DIR";
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> HighlightResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HighlightError::config(format!("{}={:?} is not a valid value", key, value)))
}

fn parse_env_bool(key: &str, value: &str) -> HighlightResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(HighlightError::config(format!(
            "{}={:?} is not a boolean",
            key, value
        ))),
    }
}

impl HighlightConfig {
    /// Full layering. `env` looks up one variable; pass `|k| std::env::var(k).ok()` in production.
    pub fn load<F>(file: Option<&Path>, env: F, overrides: &ConfigOverrides) -> HighlightResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                read_config_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply the deployment environment variables that are set
    pub fn apply_env<F>(&mut self, env: F) -> HighlightResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_keys::*;

        let mut applied = 0;
        let mut lookup = |key: &str| {
            let value = env(key);
            if let Some(value) = &value {
                debug!("Environment override {}={}", key, value);
                applied += 1;
            }
            value
        };

        if let Some(v) = lookup(MAX_CLIP_DURATION) {
            self.max_duration = parse_env(MAX_CLIP_DURATION, &v)?;
        }
        if let Some(v) = lookup(MIN_SEGMENT_LENGTH) {
            self.min_segment_length = parse_env(MIN_SEGMENT_LENGTH, &v)?;
        }
        if let Some(v) = lookup(CONTEXT_PADDING) {
            self.context_padding = parse_env(CONTEXT_PADDING, &v)?;
        }
        if let Some(v) = lookup(MERGE_GAP_THRESHOLD) {
            self.merge_gap_threshold = parse_env(MERGE_GAP_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENABLE_FADE_TRANSITIONS) {
            self.fade_enabled = parse_env_bool(ENABLE_FADE_TRANSITIONS, &v)?;
        }
        if let Some(v) = lookup(FADE_DURATION) {
            self.fade_duration = parse_env(FADE_DURATION, &v)?;
        }
        if let Some(v) = lookup(ENABLE_GPU_ENCODING) {
            self.hardware_enabled = parse_env_bool(ENABLE_GPU_ENCODING, &v)?;
        }
        if let Some(v) = lookup(GPU_ENCODER_PRESET) {
            self.hardware_preset = v.trim().to_string();
        }
        if let Some(v) = lookup(GPU_DEVICE_INDEX) {
            self.hardware_device = parse_env(GPU_DEVICE_INDEX, &v)?;
        }
        if let Some(v) = lookup(CLIP_OUTPUT_DIR) {
            // Empty means "next to the source"
            self.output_dir = Some(v.trim())
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from);
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let o = overrides.clone();
        if let Some(v) = o.max_duration {
            self.max_duration = v;
        }
        if let Some(v) = o.min_segment_length {
            self.min_segment_length = v;
        }
        if let Some(v) = o.context_padding {
            self.context_padding = v;
        }
        if let Some(v) = o.merge_gap_threshold {
            self.merge_gap_threshold = v;
        }
        if let Some(v) = o.fade_enabled {
            self.fade_enabled = v;
        }
        if let Some(v) = o.fade_duration {
            self.fade_duration = v;
        }
        if let Some(v) = o.hardware_enabled {
            self.hardware_enabled = v;
        }
        if let Some(v) = o.hardware_preset {
            self.hardware_preset = v;
        }
        if let Some(v) = o.hardware_device {
            self.hardware_device = v;
        }
        if let Some(v) = o.output_dir {
            self.output_dir = Some(v);
        }
        if let Some(v) = o.quality {
            self.quality = v;
        }
        if let Some(v) = o.ffmpeg_path {
            self.ffmpeg_path = v;
        }
        if let Some(v) = o.oracle_command {
            self.oracle_command = Some(v);
        }
    }

    /// Reject values the pipeline cannot honour
    pub fn validate(&self) -> HighlightResult<()> {
        let durations = [
            ("max_duration", self.max_duration),
            ("min_segment_length", self.min_segment_length),
            ("context_padding", self.context_padding),
            ("merge_gap_threshold", self.merge_gap_threshold),
            ("fade_duration", self.fade_duration),
            ("progress_interval_seconds", self.progress_interval_seconds),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(HighlightError::config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.max_duration <= 0.0 {
            return Err(HighlightError::config("max_duration must be greater than zero"));
        }

        let preset_ok = self
            .hardware_preset
            .strip_prefix('p')
            .and_then(|n| n.parse::<u8>().ok())
            .map_or(false, |n| (1..=7).contains(&n));
        if !preset_ok {
            return Err(HighlightError::config(format!(
                "hardware_preset must be one of p1..p7, got {:?}",
                self.hardware_preset
            )));
        }

        if self.quality > 51 {
            return Err(HighlightError::config(format!(
                "quality must be between 0 and 51, got {}",
                self.quality
            )));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(HighlightError::config("ffmpeg_path must not be empty"));
        }

        Ok(())
    }

    /// Optimizer thresholds; the source bound is filled in per file
    pub fn optimizer_settings(&self, source_duration: Option<f64>) -> OptimizerSettings {
        OptimizerSettings {
            max_duration: self.max_duration,
            min_segment_length: self.min_segment_length,
            context_padding: self.context_padding,
            merge_gap_threshold: self.merge_gap_threshold,
            source_duration,
        }
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            fade_enabled: self.fade_enabled,
            fade_duration: self.fade_duration,
            hardware_preset: self.hardware_preset.clone(),
            hardware_device: self.hardware_device,
            software_preset: self.software_preset.clone(),
            quality: self.quality,
            audio_bitrate: self.audio_bitrate.clone(),
            ffmpeg_path: self.ffmpeg_path.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs_f64(self.progress_interval_seconds)
    }
}
