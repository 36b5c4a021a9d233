// SPDX-License-Identifier: MPL-2.0
//! Application directory resolution.
//!
//! Both the data directory (persisted state) and the config directory
//! (`settings.toml`) resolve in the same order:
//!
//! 1. **Explicit override** passed to the `_with_override()` functions (tests)
//! 2. **CLI arguments** `--data-dir` / `--config-dir`, see [`init_cli_overrides`]
//! 3. **Environment variables** `ZENCONVERT_DATA_DIR` / `ZENCONVERT_CONFIG_DIR`
//! 4. **Platform default** from `dirs`, with the application name appended

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::{Error, Result};

const APP_NAME: &str = "ZenConvert";

pub const ENV_DATA_DIR: &str = "ZENCONVERT_DATA_DIR";

pub const ENV_CONFIG_DIR: &str = "ZENCONVERT_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Data,
    Config,
}

impl DirKind {
    fn env_var(self) -> &'static str {
        match self {
            DirKind::Data => ENV_DATA_DIR,
            DirKind::Config => ENV_CONFIG_DIR,
        }
    }

    fn cli_override(self) -> Option<PathBuf> {
        let cell = match self {
            DirKind::Data => &CLI_DATA_DIR,
            DirKind::Config => &CLI_CONFIG_DIR,
        };
        cell.get().and_then(Clone::clone)
    }

    fn platform_default(self) -> Option<PathBuf> {
        match self {
            DirKind::Data => dirs::data_dir(),
            DirKind::Config => dirs::config_dir(),
        }
    }
}

/// Records the `--data-dir` / `--config-dir` arguments. Call once at startup.
///
/// # Errors
///
/// Returns [`Error::Config`] if the overrides were already recorded.
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) -> Result<()> {
    CLI_DATA_DIR
        .set(data_dir.map(PathBuf::from))
        .map_err(|_| Error::Config("data dir override already initialized".into()))?;
    CLI_CONFIG_DIR
        .set(config_dir.map(PathBuf::from))
        .map_err(|_| Error::Config("config dir override already initialized".into()))?;
    Ok(())
}

fn resolve(kind: DirKind, override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path.or_else(|| kind.cli_override()) {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(kind.env_var()) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    kind.platform_default().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Directory for persisted application state (window bounds, last tool).
///
/// Returns `None` if the platform has no data directory.
pub fn get_app_data_dir() -> Option<PathBuf> {
    resolve(DirKind::Data, None)
}

pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(DirKind::Data, override_path)
}

/// Directory holding `settings.toml`.
///
/// Returns `None` if the platform has no config directory.
pub fn get_app_config_dir() -> Option<PathBuf> {
    resolve(DirKind::Config, None)
}

pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(DirKind::Config, override_path)
}
