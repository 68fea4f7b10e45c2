//! Atomic JSON writing

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::{HighlightError, HighlightResult};
use crate::output::ProvenanceDocument;

/// Write pretty JSON via a temp file in the target directory, then rename over the target.
///
/// Readers never observe a half-written document.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> HighlightResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".highlight-")
        .suffix(".json.tmp")
        .tempfile_in(&dir)?;
    serde_json::to_writer_pretty(temp.as_file_mut(), value)?;
    temp.as_file_mut().write_all(b"\n")?;
    temp.as_file_mut().sync_all()?;
    temp.persist(path).map_err(|e| HighlightError::Io(e.error))?;
    Ok(())
}

/// Write the provenance document next to the output
pub fn write_provenance(path: &Path, document: &ProvenanceDocument) -> HighlightResult<()> {
    write_json_atomic(path, document)?;
    info!("Provenance saved to {}", path.display());
    Ok(())
}

/// Read any JSON document written by this module
pub fn read_json<T: DeserializeOwned>(path: &Path) -> HighlightResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn read_provenance(path: &Path) -> HighlightResult<ProvenanceDocument> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "old").unwrap();

        let mut value = BTreeMap::new();
        value.insert("status", "success");
        write_json_atomic(&path, &value).unwrap();

        let back: BTreeMap<String, String> = read_json(&path).unwrap();
        assert_eq!(back["status"], "success");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<u32> = read_json(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
