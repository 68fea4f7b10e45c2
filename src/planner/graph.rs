//! Filter graph rendering (trim -> fade -> concat on both tracks)

use crate::planner::ClipStage;
use crate::utils::time::format_seconds_arg;

/// Output label of the concatenated video track
pub const VIDEO_OUT: &str = "[outv]";
/// Output label of the concatenated audio track
pub const AUDIO_OUT: &str = "[outa]";

/// Video chain for one stage, labelled `[v{index}]`
pub fn video_chain(stage: &ClipStage) -> String {
    let mut chain = format!(
        "[0:v]trim=start={}:end={},setpts=PTS-STARTPTS",
        format_seconds_arg(stage.start),
        format_seconds_arg(stage.end)
    );
    if let Some(fade) = stage.fade {
        chain.push_str(&format!(
            ",fade=t=in:st=0:d={d},fade=t=out:st={out}:d={d}",
            d = format_seconds_arg(fade.duration),
            out = format_seconds_arg(fade.fade_out_start)
        ));
    }
    chain.push_str(&format!("[v{}]", stage.index));
    chain
}

/// Audio chain for one stage, labelled `[a{index}]`
pub fn audio_chain(stage: &ClipStage) -> String {
    let mut chain = format!(
        "[0:a]atrim=start={}:end={},asetpts=PTS-STARTPTS",
        format_seconds_arg(stage.start),
        format_seconds_arg(stage.end)
    );
    if let Some(fade) = stage.fade {
        chain.push_str(&format!(
            ",afade=t=in:st=0:d={d},afade=t=out:st={out}:d={d}",
            d = format_seconds_arg(fade.duration),
            out = format_seconds_arg(fade.fade_out_start)
        ));
    }
    chain.push_str(&format!("[a{}]", stage.index));
    chain
}

/// Concat filter; inputs must alternate video/audio per clip or the tracks drift
pub fn concat_chain(stages: &[ClipStage]) -> String {
    let inputs: String = stages
        .iter()
        .map(|stage| format!("[v{i}][a{i}]", i = stage.index))
        .collect();
    format!(
        "{}concat=n={}:v=1:a=1{}{}",
        inputs,
        stages.len(),
        VIDEO_OUT,
        AUDIO_OUT
    )
}

/// Complete `-filter_complex` argument
pub fn build_filter_graph(stages: &[ClipStage]) -> String {
    let mut parts = Vec::with_capacity(stages.len() * 2 + 1);
    for stage in stages {
        parts.push(video_chain(stage));
        parts.push(audio_chain(stage));
    }
    parts.push(concat_chain(stages));
    parts.join(";")
}
