//! Derived artifact paths

use std::path::{Path, PathBuf};

use crate::error::{HighlightError, HighlightResult};

/// Suffix appended to the source stem for the highlight video
pub const OUTPUT_SUFFIX: &str = "_Summary";
/// Container of the highlight video
pub const OUTPUT_EXTENSION: &str = "mp4";
/// Suffix appended to the output stem for the provenance document
pub const METADATA_SUFFIX: &str = "_metadata.json";

/// Extensions accepted as source videos
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Stem of a path as an owned string
pub fn file_stem(path: &Path) -> HighlightResult<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| HighlightError::validation(format!("{} has no file name", path.display())))
}

/// `<output_dir or source dir>/<stem>_Summary.mp4`
pub fn derive_output_path(source: &Path, output_dir: Option<&Path>) -> HighlightResult<PathBuf> {
    let stem = file_stem(source)?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(format!("{}{}.{}", stem, OUTPUT_SUFFIX, OUTPUT_EXTENSION)))
}

/// `<output dir>/<output stem>_metadata.json`
pub fn metadata_path_for(output: &Path) -> HighlightResult<PathBuf> {
    let stem = file_stem(output)?;
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(dir.join(format!("{}{}", stem, METADATA_SUFFIX)))
}

/// Whether the path has one of the accepted video extensions (case-insensitive)
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map_or(false, |ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether the path looks like a highlight this tool produced
pub fn is_highlight_output(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().ends_with(OUTPUT_SUFFIX))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_next_to_source() {
        let out = derive_output_path(Path::new("/talks/2024-05-12.mp4"), None).unwrap();
        assert_eq!(out, PathBuf::from("/talks/2024-05-12_Summary.mp4"));
    }

    #[test]
    fn test_output_dir_override() {
        let out = derive_output_path(Path::new("/talks/sunday.MOV"), Some(Path::new("/clips"))).unwrap();
        assert_eq!(out, PathBuf::from("/clips/sunday_Summary.mp4"));
    }

    #[test]
    fn test_bare_file_name() {
        let out = derive_output_path(Path::new("talk.mkv"), None).unwrap();
        assert_eq!(out, PathBuf::from("talk_Summary.mp4"));
    }

    #[test]
    fn test_metadata_sibling() {
        let meta = metadata_path_for(Path::new("/clips/sunday_Summary.mp4")).unwrap();
        assert_eq!(meta, PathBuf::from("/clips/sunday_Summary_metadata.json"));
    }

    #[test]
    fn test_video_extensions() {
        assert!(is_video_file(Path::new("a.mp4")));
        assert!(is_video_file(Path::new("a.WebM")));
        assert!(!is_video_file(Path::new("a.json")));
        assert!(!is_video_file(Path::new("mp4")));
    }

    #[test]
    fn test_highlight_output_detection() {
        let source = Path::new("/talks/sunday.mp4");
        assert!(!is_highlight_output(source));
        assert!(is_highlight_output(&derive_output_path(source, None).unwrap()));
        assert!(!is_highlight_output(Path::new("/talks/Summary.mp4")));
    }
}
