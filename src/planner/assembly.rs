//! Assembly planner implementation

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::Segment;
use crate::error::{HighlightError, HighlightResult};
use crate::planner::{AssemblyPlan, Backend, ClipStage, EncodeProfile, FadeWindow};
use crate::probe::CapabilityDecision;
use crate::utils::path::derive_output_path;

/// Knobs the planner needs; a projection of the run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    pub fade_enabled: bool,
    pub fade_duration: f64,
    pub hardware_preset: String,
    pub hardware_device: u32,
    pub software_preset: String,
    pub quality: u8,
    pub audio_bitrate: String,
    pub ffmpeg_path: String,
    pub output_dir: Option<PathBuf>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            fade_enabled: true,
            fade_duration: 0.5,
            hardware_preset: "p6".to_string(),
            hardware_device: 0,
            software_preset: "medium".to_string(),
            quality: 23,
            audio_bitrate: "192k".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            output_dir: None,
        }
    }
}

/// Compiles optimized segments into an assembly plan. Performs no I/O.
pub struct AssemblyPlanner {
    settings: PlannerSettings,
}

impl AssemblyPlanner {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    /// Plan using the backend the capability detector settled on
    pub fn plan(
        &self,
        source_path: &Path,
        segments: &[Segment],
        decision: &CapabilityDecision,
    ) -> HighlightResult<AssemblyPlan> {
        let backend = if decision.enabled {
            Backend::Hardware
        } else {
            Backend::Software
        };
        self.plan_for_backend(source_path, segments, backend)
    }

    /// Plan for an explicit backend, e.g. the software retry after a hardware failure
    pub fn plan_for_backend(
        &self,
        source_path: &Path,
        segments: &[Segment],
        backend: Backend,
    ) -> HighlightResult<AssemblyPlan> {
        Self::check_segments(segments)?;

        let profile = self.profile_for(backend);
        let output_path = derive_output_path(source_path, self.settings.output_dir.as_deref())?;
        let stages: Vec<ClipStage> = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| self.stage_for(index, segment))
            .collect();

        let faded = stages.iter().filter(|stage| stage.fade.is_some()).count();
        info!(
            "Planned {} clips ({} with fades) on {} backend ({}, preset {})",
            stages.len(),
            faded,
            backend,
            profile.encoder,
            profile.preset
        );

        Ok(AssemblyPlan {
            source_path: source_path.to_path_buf(),
            output_path,
            segments: segments.to_vec(),
            stages,
            fade_enabled: self.settings.fade_enabled,
            fade_duration: self.settings.fade_duration,
            profile,
            audio_bitrate: self.settings.audio_bitrate.clone(),
            program: self.settings.ffmpeg_path.clone(),
        })
    }

    /// Encoder profile for a backend
    pub fn profile_for(&self, backend: Backend) -> EncodeProfile {
        match backend {
            Backend::Hardware => EncodeProfile::hardware(
                self.settings.hardware_preset.clone(),
                self.settings.quality,
                self.settings.hardware_device,
            ),
            Backend::Software => {
                EncodeProfile::software(self.settings.software_preset.clone(), self.settings.quality)
            }
        }
    }

    fn stage_for(&self, index: usize, segment: &Segment) -> ClipStage {
        let duration = segment.duration();
        let fade_duration = self.settings.fade_duration;
        let fade = (self.settings.fade_enabled
            && fade_duration > 0.0
            && duration > 2.0 * fade_duration)
            .then(|| FadeWindow {
                duration: fade_duration,
                fade_out_start: duration - fade_duration,
            });

        ClipStage {
            index,
            start: segment.start,
            end: segment.end,
            fade,
        }
    }

    fn check_segments(segments: &[Segment]) -> HighlightResult<()> {
        if segments.is_empty() {
            return Err(HighlightError::InvalidPlan {
                message: "no segments to assemble".to_string(),
            });
        }

        for segment in segments {
            if !(segment.start >= 0.0 && segment.start < segment.end) {
                return Err(HighlightError::InvalidPlan {
                    message: format!("segment {:.3}-{:.3} is empty or negative", segment.start, segment.end),
                });
            }
        }

        for pair in segments.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(HighlightError::InvalidPlan {
                    message: format!(
                        "segments out of order or overlapping at {:.3}s",
                        pair[1].start
                    ),
                });
            }
        }

        Ok(())
    }
}
