// TDB - Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration system for TDB
//!
//! User preferences live in `~/.tdb.toml`. Every section is optional; missing
//! keys take their default values.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How variables and locations are printed
    pub display: DisplayConfig,
    /// Replay session settings
    pub replay: ReplayConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix for variables written by the last step
    pub dirty_marker: String,
    /// Print globals after every step
    pub show_globals: bool,
    /// Print the source line after every step
    pub show_source: bool,
}

/// Replay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Breakpoints set when a session starts
    pub breakpoints: Vec<i32>,
    /// Reject malformed traces before replaying them
    pub auto_validate: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also log to `$TMP/tdb-logs/tdb`
    pub file_logging: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dirty_marker: tdb_engine::display::DIRTY_MARKER.to_string(),
            show_globals: true,
            show_source: true,
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { breakpoints: Vec::new(), auto_validate: true }
    }
}

impl Config {
    /// Default configuration file location
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".tdb.toml"))
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as TOML: {path:?}"))?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        tdb_common::logging::ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display.dirty_marker, "##");
        assert!(config.replay.auto_validate);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        tdb_common::logging::ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdb.toml");
        fs::write(&path, "[replay]\nbreakpoints = [3, 9]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.replay.breakpoints, vec![3, 9]);
        assert!(config.replay.auto_validate);
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        tdb_common::logging::ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdb.toml");
        let mut config = Config::default();
        config.display.dirty_marker = "* ".to_string();
        config.logging.file_logging = true;

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        tdb_common::logging::ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdb.toml");
        fs::write(&path, "display = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err}").contains("Failed to parse config file"));
    }
}
