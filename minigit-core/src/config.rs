use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `.minigit/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub core: CoreConfig,
    pub status: StatusConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub path_mode: PathMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    /// Working-directory names hidden from status, in addition to `.minigit`.
    pub ignore: Vec<String>,
}

/// How a working-directory path is named inside staging and snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Base filename only. Same-named files from different directories
    /// share one staging slot.
    #[default]
    Flat,
    /// Path relative to the working directory, `/`-separated.
    Relative,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.core.path_mode, PathMode::Flat);
        assert!(config.status.ignore.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [core]
            path_mode = "relative"

            [status]
            ignore = ["target", "notes.md"]
            "#,
        )
        .unwrap();

        assert_eq!(config.core.path_mode, PathMode::Relative);
        assert_eq!(config.status.ignore, vec!["target", "notes.md"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse("[status]\nignore = [\"build\"]\n").unwrap();
        assert_eq!(config.core.path_mode, PathMode::Flat);
        assert_eq!(config.status.ignore, vec!["build"]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::parse("[core]\npathmode = \"relative\"\n").is_err());
        assert!(Config::parse("[core]\npath_mode = \"nested\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
