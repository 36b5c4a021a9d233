// SPDX-License-Identifier: MPL-2.0
//! User preferences stored in `settings.toml`.
//!
//! # Examples
//!
//! ```no_run
//! use zenconvert::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.language = Some("fr".to_string());
//! config::save(&config).expect("Failed to save config");
//! ```

mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub language: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub default_image_quality: Option<u8>,
    /// Where `youtube:download` writes when no output path is given.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,
    /// Explicit `ffmpeg` binary; looked up on `PATH` when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit `yt-dlp` binary; looked up on `PATH` when unset.
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Some("en".to_string()),
            theme: Theme::default(),
            default_image_quality: Some(DEFAULT_IMAGE_QUALITY),
            download_directory: None,
            ffmpeg_path: None,
            ytdlp_path: None,
        }
    }
}

impl Config {
    /// Download directory: configured value, else the platform's downloads
    /// folder, else the current directory.
    #[must_use]
    pub fn resolved_download_directory(&self) -> PathBuf {
        self.download_directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Reads `path`; malformed TOML falls back to defaults.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            log::warn!("ignoring malformed settings file: {err}");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_fields() {
        let config = Config {
            language: Some("fr".to_string()),
            theme: Theme::Dark,
            default_image_quality: Some(65),
            download_directory: Some(PathBuf::from("/downloads")),
            ffmpeg_path: None,
            ytdlp_path: Some(PathBuf::from("/opt/yt-dlp")),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "language = \"de\"\n").expect("write");

        let loaded = load_from_path(&config_path).expect("load");
        assert_eq!(loaded.language.as_deref(), Some("de"));
        assert_eq!(loaded.theme, Theme::Light);
        assert!(loaded.ffmpeg_path.is_none());
    }

    #[test]
    fn configured_download_directory_wins() {
        let config = Config {
            download_directory: Some(PathBuf::from("/mine")),
            ..Config::default()
        };
        assert_eq!(config.resolved_download_directory(), PathBuf::from("/mine"));
    }
}
