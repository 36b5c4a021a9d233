// SPDX-License-Identifier: MPL-2.0
//! Selected files and their conversion lifecycle.
//!
//! A [`SelectedFile`] is created by the privileged side when the user picks
//! files in a dialog (or validates a dropped path) and is then owned by the
//! presentation side's [`WorkingSet`]. The bridge never keeps file lists
//! between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Conversion status of a queued file.
///
/// Legal transitions: `Pending -> Processing -> {Completed | Failed}`.
/// A finished file may be re-queued (`Completed | Failed -> Pending`) when
/// the user retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl FileStatus {
    /// Returns `true` if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: FileStatus) -> bool {
        use FileStatus::{Completed, Failed, Pending, Processing};
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Pending)
                | (Failed, Pending)
        )
    }

    /// Returns `true` once the file has reached a terminal state.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Failed)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileStatus::Pending => "pending",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: FileStatus,
    pub to: FileStatus,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move file from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// Named extension filter shown in a native open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// Returns `true` if `path`'s extension is listed (case-insensitive).
    /// A `*` entry matches everything.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.iter().any(|ext| ext == "*") {
            return true;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// A file picked by the user, as seen by the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub id: String,
    pub path: String,
    pub name: String,
    pub extension: String,
    pub mime_type: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch; `0` when the platform hides it.
    pub last_modified: i64,
    #[serde(default)]
    pub status: FileStatus,
}

impl SelectedFile {
    /// Builds a pending entry from a path plus the filesystem facts probed for it.
    #[must_use]
    pub fn from_path(path: &Path, size: u64, last_modified: i64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_string_lossy().into_owned(),
            mime_type: mime_for_extension(&extension).to_string(),
            name,
            extension,
            size,
            last_modified,
            status: FileStatus::Pending,
        }
    }

    /// Moves the file to `next`, refusing illegal transitions.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if the lifecycle forbids the move.
    pub fn transition_to(&mut self, next: FileStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Guesses a MIME type from a lowercase extension.
#[must_use]
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "srt" => "application/x-subrip",
        "vtt" => "text/vtt",
        "ass" => "text/x-ssa",
        _ => "application/octet-stream",
    }
}

/// Presentation-side list of queued files.
///
/// Files are added after a dialog call returns, mutated as conversions run,
/// and removed locally; nothing here crosses the bridge on its own.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    files: Vec<SelectedFile>,
}

impl WorkingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends files, skipping paths that are already queued.
    pub fn add(&mut self, files: impl IntoIterator<Item = SelectedFile>) {
        for file in files {
            if !self.files.iter().any(|f| f.path == file.path) {
                self.files.push(file);
            }
        }
    }

    /// Removes a file by id. Returns the removed entry, if any.
    pub fn remove(&mut self, id: &str) -> Option<SelectedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Applies a status transition to the file with `id`.
    ///
    /// Returns `Ok(false)` when no file has that id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if the lifecycle forbids the move.
    pub fn set_status(&mut self, id: &str, status: FileStatus) -> Result<bool, InvalidTransition> {
        match self.files.iter_mut().find(|f| f.id == id) {
            Some(file) => file.transition_to(status).map(|()| true),
            None => Ok(false),
        }
    }

    /// Ids of files still waiting to be processed, in queue order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Pending)
            .map(|f| f.id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
