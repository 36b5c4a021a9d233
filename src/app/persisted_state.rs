// SPDX-License-Identifier: MPL-2.0
//! Session state that survives restarts, stored as CBOR.
//!
//! This is the key-value store the host reads at startup and writes back on
//! shutdown: window bounds, the last active tool and the last directory a
//! dialog opened. User-editable preferences live in `settings.toml` instead
//! (see [`crate::config`]).

use super::paths;
use crate::domain::navigation::NavigationState;
use crate::domain::window::WindowState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.cbor";

/// Warning keys surfaced when the state file cannot be used.
pub mod warning {
    pub const PARSE: &str = "state-parse-error";
    pub const READ: &str = "state-read-error";
    pub const PATH: &str = "state-path-error";
    pub const DIR: &str = "state-dir-error";
    pub const WRITE: &str = "state-write-error";
    pub const CREATE: &str = "state-create-error";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    #[serde(default)]
    pub window_state: WindowState,

    #[serde(default)]
    pub navigation_state: NavigationState,

    /// Used as the dialog's starting directory when the caller gives none.
    #[serde(default)]
    pub last_used_directory: Option<PathBuf>,
}

impl AppState {
    /// Loads from the default location. Never fails: a missing file yields
    /// defaults, an unreadable one yields defaults plus a warning key.
    pub fn load() -> (Self, Option<&'static str>) {
        Self::load_from(None)
    }

    pub fn load_from(base_dir: Option<PathBuf>) -> (Self, Option<&'static str>) {
        let Some(path) = Self::state_file_path_with_override(base_dir) else {
            return (Self::default(), None);
        };

        if !path.exists() {
            return (Self::default(), None);
        }

        match fs::File::open(&path) {
            Ok(file) => match ciborium::from_reader(BufReader::new(file)) {
                Ok(state) => (state, None),
                Err(_) => (Self::default(), Some(warning::PARSE)),
            },
            Err(_) => (Self::default(), Some(warning::READ)),
        }
    }

    /// Saves to the default location, returning a warning key on failure.
    pub fn save(&self) -> Option<&'static str> {
        self.save_to(None)
    }

    pub fn save_to(&self, base_dir: Option<PathBuf>) -> Option<&'static str> {
        let Some(path) = Self::state_file_path_with_override(base_dir) else {
            return Some(warning::PATH);
        };

        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return Some(warning::DIR);
            }
        }

        match fs::File::create(&path) {
            Ok(file) => {
                if ciborium::into_writer(self, BufWriter::new(file)).is_err() {
                    return Some(warning::WRITE);
                }
                None
            }
            Err(_) => Some(warning::CREATE),
        }
    }

    fn state_file_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
        paths::get_app_data_dir_with_override(base_dir).map(|mut path| {
            path.push(STATE_FILE);
            path
        })
    }

    /// Remembers the parent directory of `file_path`. Root paths are ignored.
    pub fn remember_directory_of(&mut self, file_path: &Path) {
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.last_used_directory = Some(parent.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::navigation::ToolType;
    use tempfile::tempdir;

    #[test]
    fn default_state_matches_first_launch() {
        let state = AppState::default();
        assert_eq!(state.window_state.width, 1024);
        assert_eq!(state.navigation_state.current_tool, ToolType::ImageConverter);
        assert!(state.last_used_directory.is_none());
    }

    #[test]
    fn remember_directory_extracts_parent() {
        let mut state = AppState::default();
        state.remember_directory_of(Path::new("/media/clips/a.mp4"));
        assert_eq!(state.last_used_directory, Some(PathBuf::from("/media/clips")));
    }

    #[test]
    fn remember_directory_ignores_root() {
        let mut state = AppState::default();
        state.remember_directory_of(Path::new("/"));
        assert!(state.last_used_directory.is_none());
    }

    #[test]
    fn save_to_and_load_from_custom_directory() {
        let temp_dir = tempdir().expect("create temp dir");
        let base_dir = temp_dir.path().to_path_buf();

        let mut original = AppState::default();
        original.window_state.width = 1400;
        original.window_state.x = Some(40);
        original.navigation_state.select(ToolType::VideoConverter, 99);
        original.last_used_directory = Some(PathBuf::from("/some/dir"));

        assert!(original.save_to(Some(base_dir.clone())).is_none());
        assert!(base_dir.join(STATE_FILE).exists());

        let (loaded, warning) = AppState::load_from(Some(base_dir));
        assert!(warning.is_none());
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_from_empty_directory_returns_default() {
        let temp_dir = tempdir().expect("create temp dir");
        let (state, warning) = AppState::load_from(Some(temp_dir.path().to_path_buf()));
        assert!(warning.is_none());
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn load_from_corrupted_file_returns_default_with_warning() {
        let temp_dir = tempdir().expect("create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        fs::write(base_dir.join(STATE_FILE), "not valid cbor data").expect("write file");

        let (state, warning) = AppState::load_from(Some(base_dir));
        assert_eq!(warning, Some(warning::PARSE));
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp_dir = tempdir().expect("create temp dir");
        let nested_dir = temp_dir.path().join("nested").join("deeply");

        assert!(AppState::default().save_to(Some(nested_dir.clone())).is_none());
        assert!(nested_dir.join(STATE_FILE).exists());
    }
}
