// SPDX-License-Identifier: MPL-2.0
//! The fixed set of bridge channels.
//!
//! Channels are a closed enum: a name that does not parse into [`Channel`]
//! can never reach a handler.

use std::fmt;
use std::str::FromStr;

/// How a channel is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Request/response: exactly one envelope comes back, eventually.
    Call,
    /// Fire-and-forget: no envelope and no delivery guarantee.
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    DialogOpen,
    WindowGetState,
    WindowMinimize,
    WindowMaximize,
    WindowUnmaximize,
    WindowClose,
    FilesValidate,
    FilesGetMetadata,
    NavigationGetTool,
    NavigationSetTool,
    ImageGetMetadata,
    ImageConvert,
    VideoConvert,
    YoutubeGetInfo,
    YoutubeDownload,
}

impl Channel {
    pub const ALL: [Channel; 15] = [
        Channel::DialogOpen,
        Channel::WindowGetState,
        Channel::WindowMinimize,
        Channel::WindowMaximize,
        Channel::WindowUnmaximize,
        Channel::WindowClose,
        Channel::FilesValidate,
        Channel::FilesGetMetadata,
        Channel::NavigationGetTool,
        Channel::NavigationSetTool,
        Channel::ImageGetMetadata,
        Channel::ImageConvert,
        Channel::VideoConvert,
        Channel::YoutubeGetInfo,
        Channel::YoutubeDownload,
    ];

    /// Wire name, e.g. `"image:convert"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Channel::DialogOpen => "dialog:open",
            Channel::WindowGetState => "window:get-state",
            Channel::WindowMinimize => "window:minimize",
            Channel::WindowMaximize => "window:maximize",
            Channel::WindowUnmaximize => "window:unmaximize",
            Channel::WindowClose => "window:close",
            Channel::FilesValidate => "files:validate",
            Channel::FilesGetMetadata => "files:get-metadata",
            Channel::NavigationGetTool => "navigation:get-tool",
            Channel::NavigationSetTool => "navigation:set-tool",
            Channel::ImageGetMetadata => "image:get-metadata",
            Channel::ImageConvert => "image:convert",
            Channel::VideoConvert => "video:convert",
            Channel::YoutubeGetInfo => "youtube:get-info",
            Channel::YoutubeDownload => "youtube:download",
        }
    }

    #[must_use]
    pub fn kind(self) -> ChannelKind {
        match self {
            Channel::WindowMinimize
            | Channel::WindowMaximize
            | Channel::WindowUnmaximize
            | Channel::WindowClose
            | Channel::NavigationSetTool => ChannelKind::Signal,
            _ => ChannelKind::Call,
        }
    }

    #[must_use]
    pub fn is_call(self) -> bool {
        self.kind() == ChannelKind::Call
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a channel name is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel '{}'", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}
