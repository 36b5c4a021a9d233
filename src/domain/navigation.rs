// SPDX-License-Identifier: MPL-2.0
//! Which tool page is active.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    #[default]
    ImageConverter,
    VideoConverter,
    YoutubeDownloader,
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolType::ImageConverter => "image-converter",
            ToolType::VideoConverter => "video-converter",
            ToolType::YoutubeDownloader => "youtube-downloader",
        })
    }
}

/// Current and previous tool, plus when the current one was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    #[serde(rename = "tool")]
    pub current_tool: ToolType,
    pub previous_tool: Option<ToolType>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl NavigationState {
    #[must_use]
    pub fn new(timestamp: i64) -> Self {
        Self {
            current_tool: ToolType::default(),
            previous_tool: None,
            timestamp,
        }
    }

    /// Switches to `tool`. Selecting the active tool again is a no-op so the
    /// previous tool is not lost.
    pub fn select(&mut self, tool: ToolType, timestamp: i64) {
        if tool == self.current_tool {
            return;
        }
        self.previous_tool = Some(self.current_tool);
        self.current_tool = tool;
        self.timestamp = timestamp;
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(0)
    }
}
