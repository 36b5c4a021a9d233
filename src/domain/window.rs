// SPDX-License-Identifier: MPL-2.0
//! Main window geometry as reported over `window:get-state`.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Snapshot of the main window.
///
/// `x`/`y` are `None` until the window has been placed at least once, in
/// which case the platform centers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub width: u32,
    pub height: u32,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub is_maximized: bool,
    pub is_fullscreen: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            x: None,
            y: None,
            is_maximized: false,
            is_fullscreen: false,
        }
    }
}
