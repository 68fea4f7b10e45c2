// TOML config adapter - Configuration files in TOML or YAML

use std::path::Path;

use serde::Deserialize;

use crate::config::HighlightConfig;
use crate::error::{HighlightError, HighlightResult};

/// Top-level layout of a config file; options live under `highlight`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    highlight: HighlightConfig,
}

/// Parse TOML text (`[highlight]` table)
pub fn parse_toml(content: &str) -> HighlightResult<HighlightConfig> {
    let file: ConfigFile = toml::from_str(content)
        .map_err(|e| HighlightError::config(format!("Failed to parse TOML config: {}", e)))?;
    Ok(file.highlight)
}

/// Parse YAML text (`highlight:` mapping)
pub fn parse_yaml(content: &str) -> HighlightResult<HighlightConfig> {
    if content.trim().is_empty() {
        return Ok(HighlightConfig::default());
    }
    let file: ConfigFile = serde_yaml::from_str(content)
        .map_err(|e| HighlightError::config(format!("Failed to parse YAML config: {}", e)))?;
    Ok(file.highlight)
}

/// Read a config file, choosing the format from its extension
pub fn read_config_file(path: &Path) -> HighlightResult<HighlightConfig> {
    if !path.exists() {
        return Err(HighlightError::config(format!(
            "Config file does not exist: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => parse_toml(&content),
        "yaml" | "yml" => parse_yaml(&content),
        other => Err(HighlightError::config(format!(
            "Unsupported config format '{}' for {}, expected .toml, .yaml or .yml",
            other,
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_partial_table_keeps_defaults() {
        let config = parse_toml("[highlight]\nmax_duration = 300.0\nhardware_enabled = false\n").unwrap();
        assert_eq!(config.max_duration, 300.0);
        assert!(!config.hardware_enabled);
        assert_eq!(config.min_segment_length, 30.0);
        assert_eq!(config.hardware_preset, "p6");
    }

    #[test]
    fn test_toml_without_table_is_default() {
        assert_eq!(parse_toml("").unwrap(), HighlightConfig::default());
    }

    #[test]
    fn test_yaml_mapping() {
        let config = parse_yaml("highlight:\n  fade_duration: 1.0\n  output_dir: /clips\n").unwrap();
        assert_eq!(config.fade_duration, 1.0);
        assert_eq!(config.output_dir, Some(std::path::PathBuf::from("/clips")));
    }

    #[test]
    fn test_bad_types_are_config_errors() {
        let err = parse_toml("[highlight]\nmax_duration = \"long\"\n").unwrap_err();
        assert!(matches!(err, HighlightError::Config { .. }));
    }

    #[test]
    fn test_extension_selects_format() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("config.yml");
        std::fs::write(&yaml, "highlight:\n  quality: 28\n").unwrap();
        assert_eq!(read_config_file(&yaml).unwrap().quality, 28);

        let ini = dir.path().join("config.ini");
        std::fs::write(&ini, "quality=28").unwrap();
        assert!(read_config_file(&ini).is_err());

        assert!(read_config_file(&dir.path().join("absent.toml")).is_err());
    }
}
