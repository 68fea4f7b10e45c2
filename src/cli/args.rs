//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::config::ConfigOverrides;

fn device_index(s: &str) -> Result<u32, String> {
    number_range(s, 0, 15)
}

fn quality_value(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

/// Configuration overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Output budget in seconds
    #[arg(long, global = true)]
    pub max_duration: Option<f64>,

    /// Shortest segment kept, in seconds
    #[arg(long, global = true)]
    pub min_segment_length: Option<f64>,

    /// Seconds added before and after each segment
    #[arg(long, global = true)]
    pub context_padding: Option<f64>,

    /// Segments closer than this are merged
    #[arg(long, global = true)]
    pub merge_gap_threshold: Option<f64>,

    /// Disable fade transitions
    #[arg(long, global = true)]
    pub no_fade: bool,

    /// Fade length in seconds
    #[arg(long, global = true)]
    pub fade_duration: Option<f64>,

    /// Never use the hardware encoder
    #[arg(long, global = true)]
    pub no_hardware: bool,

    /// NVENC preset (p1-p7)
    #[arg(long, global = true)]
    pub hardware_preset: Option<String>,

    /// GPU index (0-15)
    #[arg(long, global = true, value_parser = device_index)]
    pub hardware_device: Option<u32>,

    /// Directory for the highlight and its metadata
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Constant quality (0-51)
    #[arg(long, global = true, value_parser = quality_value)]
    pub quality: Option<u8>,

    /// ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Oracle command receiving the request on stdin
    #[arg(long, global = true)]
    pub oracle_command: Option<String>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_duration: self.max_duration,
            min_segment_length: self.min_segment_length,
            context_padding: self.context_padding,
            merge_gap_threshold: self.merge_gap_threshold,
            fade_enabled: self.no_fade.then_some(false),
            fade_duration: self.fade_duration,
            hardware_enabled: self.no_hardware.then_some(false),
            hardware_preset: self.hardware_preset.clone(),
            hardware_device: self.hardware_device,
            output_dir: self.output_dir.clone(),
            quality: self.quality,
            ffmpeg_path: self.ffmpeg.clone(),
            oracle_command: self.oracle_command.clone(),
        }
    }
}

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Source video
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory holding the transcript, summary and oracle response
    /// (default: `<video dir>/<video stem>/`)
    #[arg(short, long)]
    pub artifacts: Option<PathBuf>,

    /// Transcript file, overriding the one in the artifact directory
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Summary file, overriding the one in the artifact directory
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Print the compiled plan without running the transcoder
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory of source videos
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Directory holding one artifact directory per video (default: the input directory)
    #[arg(short, long)]
    pub artifacts: Option<PathBuf>,

    /// Results file
    #[arg(long, default_value = "batch_summaries.json")]
    pub results: PathBuf,

    /// Skip videos that already have a successful metadata document
    #[arg(long)]
    pub resume: bool,
}

/// Arguments for the retry-failed command
#[derive(Args, Debug)]
pub struct RetryArgs {
    /// Directory of source videos
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Directory holding one artifact directory per video (default: the input directory)
    #[arg(short, long)]
    pub artifacts: Option<PathBuf>,

    /// Results file of the earlier batch
    #[arg(long, default_value = "batch_summaries.json")]
    pub results: PathBuf,
}
