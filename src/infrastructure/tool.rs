// SPDX-License-Identifier: MPL-2.0
//! External binary discovery and output helpers.
//!
//! A tool is looked up in this order: the path configured in `settings.toml`,
//! then `PATH`. Nothing is downloaded.

use std::path::{Path, PathBuf};

/// External programs the host delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
    YtDlp,
}

impl Tool {
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
            Tool::YtDlp => "yt-dlp",
        }
    }

    /// Finds the binary. `configured` wins when it points at an existing file.
    #[must_use]
    pub fn locate(self, configured: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = configured {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            log::warn!(
                "Configured {} path does not exist, falling back to PATH",
                self.program()
            );
        }
        which::which(self.program()).ok()
    }

    /// Finds `ffprobe` next to a configured `ffmpeg` before searching `PATH`.
    #[must_use]
    pub fn locate_ffprobe(configured_ffmpeg: Option<&Path>) -> Option<PathBuf> {
        let sibling = configured_ffmpeg.and_then(|ffmpeg| {
            let name = format!("ffprobe{}", std::env::consts::EXE_SUFFIX);
            let candidate = ffmpeg.with_file_name(name);
            candidate.is_file().then_some(candidate)
        });
        sibling.or_else(|| Tool::Ffprobe.locate(None))
    }
}

/// Last `max_lines` non-empty lines of a process stream, lossily decoded.
#[must_use]
pub fn tail_lines(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
