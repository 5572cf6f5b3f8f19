//! Wrench time configuration.
//!
//! Loaded from `~/.wrench-time/config.toml`. Every key is optional and a
//! missing file means defaults:
//!
//! ```toml
//! default-observer = "Klezio Fernandes"
//! export-dir = "/home/klezio/medicoes"
//! default-date-range = "last-7-days"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consolidate::DateRange;

/// Wrench time configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Observer name offered when a session starts.
    #[serde(default)]
    pub default_observer: Option<String>,

    /// Where exports go when no path is given. Defaults to the working directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Date range a fresh consolidation filter starts with.
    #[serde(default)]
    pub default_date_range: DateRange,
}

impl Config {
    /// Load config from `~/.wrench-time/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.wrench-time/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wrench-time").join("config.toml"))
    }

    /// Directory for exports without an explicit path.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.default_date_range, DateRange::Last7Days);
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn reads_all_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default-observer = \"Klezio\"\n\
             export-dir = \"/tmp/medicoes\"\n\
             default-date-range = \"today\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_observer.as_deref(), Some("Klezio"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/medicoes"));
        assert_eq!(config.default_date_range, DateRange::Today);
    }

    #[test]
    fn rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default-date-range = \"fortnight\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.starts_with("invalid config at"), "{err}");
    }
}
