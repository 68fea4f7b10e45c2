//! Assembly planning: segment list + encoder profile -> processing graph and invocation

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{total_duration, Segment};

pub mod assembly;
pub mod graph;
pub mod profile;

pub use assembly::{AssemblyPlanner, PlannerSettings};
pub use profile::EncodeProfile;

/// Encoding execution path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// GPU encoder (NVENC) with CUDA decoding
    Hardware,
    /// CPU encoder (libx264)
    Software,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Hardware => write!(f, "hardware"),
            Backend::Software => write!(f, "software"),
        }
    }
}

/// Fade applied to both tracks of one clip, relative to the clip's own timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeWindow {
    pub duration: f64,
    /// Fade-out start; the fade ends exactly at the clip's end
    pub fade_out_start: f64,
}

/// Trim-and-reset operation for one segment on the video and audio tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipStage {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub fade: Option<FadeWindow>,
}

impl ClipStage {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Concrete external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Render as a copy-pasteable shell command line
    pub fn to_shell_string(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_shell_string())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Fully specified instructions for producing the highlight video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyPlan {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Chronological, non-overlapping
    pub segments: Vec<Segment>,
    pub stages: Vec<ClipStage>,
    pub fade_enabled: bool,
    pub fade_duration: f64,
    pub profile: EncodeProfile,
    pub audio_bitrate: String,
    pub program: String,
}

impl AssemblyPlan {
    pub fn backend(&self) -> Backend {
        self.profile.backend
    }

    /// Expected length of the output in seconds
    pub fn planned_duration(&self) -> f64 {
        total_duration(&self.segments)
    }

    /// Filter graph trimming, fading and concatenating every stage
    pub fn filter_graph(&self) -> String {
        graph::build_filter_graph(&self.stages)
    }

    /// Compile the plan into the transcoder command line
    pub fn invocation(&self) -> Invocation {
        let mut args = self.profile.input_args();

        args.extend([
            "-i".to_string(),
            self.source_path.to_string_lossy().to_string(),
            "-filter_complex".to_string(),
            self.filter_graph(),
            "-map".to_string(),
            graph::VIDEO_OUT.to_string(),
            "-map".to_string(),
            graph::AUDIO_OUT.to_string(),
        ]);

        args.extend(self.profile.video_args());

        args.extend([
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-y".to_string(),
            self.output_path.to_string_lossy().to_string(),
        ]);

        Invocation {
            program: self.program.clone(),
            args,
        }
    }
}
