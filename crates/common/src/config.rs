//! Configuration file plumbing.
//!
//! The concrete application config lives next to the code it configures
//! (the capture engine owns `AppConfig`); this module provides the pieces
//! every config shares: logging settings, file locations, and JSON
//! load/save helpers.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PalmcapError, PalmcapResult};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "palmcap=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
        .join("palmcap")
        .join("config.json")
}

/// Default directory for capture sessions.
pub fn default_captures_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
        .join("palmcap")
        .join("captures")
}

/// Load a JSON config from `path`, failing on a missing or malformed file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> PalmcapResult<T> {
    if !path.exists() {
        return Err(PalmcapError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| PalmcapError::config(format!("{}: {e}", path.display())))
}

/// Load a JSON config from `path`, falling back to defaults.
///
/// A missing file is silent; a file that cannot be read or parsed is
/// logged and ignored.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match load_json(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
            T::default()
        }
    }
}

/// Write a config as pretty JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> PalmcapResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        home_fallback
            .iter()
            .fold(PathBuf::from(home), |path, part| path.join(part))
    })
}
