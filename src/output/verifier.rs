//! Post-execution output verification

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{HighlightError, HighlightResult};
use crate::utils::format_file_size;

/// Sizes of the produced file and its source
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStats {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub source_size_bytes: u64,
}

/// Confirm the transcoder actually wrote the output.
///
/// A missing file after a reported success is never retried.
pub fn verify_output(output: &Path, source: &Path) -> HighlightResult<OutputStats> {
    let size_bytes = match std::fs::metadata(output) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => {
            return Err(HighlightError::ArtifactMissingPostExecution {
                path: output.display().to_string(),
            })
        }
    };
    let source_size_bytes = std::fs::metadata(source).map(|m| m.len()).unwrap_or(0);

    info!(
        "Output created: {} ({}, source {})",
        output.display(),
        format_file_size(size_bytes),
        format_file_size(source_size_bytes)
    );

    Ok(OutputStats {
        path: output.to_path_buf(),
        size_bytes,
        source_size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_output(&dir.path().join("out.mp4"), &dir.path().join("in.mp4")).unwrap_err();
        assert!(matches!(err, HighlightError::ArtifactMissingPostExecution { .. }));
    }

    #[test]
    fn test_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&source, vec![0u8; 1000]).unwrap();
        std::fs::write(&output, vec![0u8; 100]).unwrap();

        let stats = verify_output(&output, &source).unwrap();
        assert_eq!(stats.size_bytes, 100);
        assert_eq!(stats.source_size_bytes, 1000);
    }

    #[test]
    fn test_directory_is_not_output() {
        let dir = tempfile::tempdir().unwrap();
        assert!(verify_output(dir.path(), dir.path()).is_err());
    }
}
