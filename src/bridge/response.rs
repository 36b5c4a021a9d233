// SPDX-License-Identifier: MPL-2.0
//! Success payloads carried in envelope `data`, one per call channel.

use serde::{Deserialize, Serialize};

use crate::application::port::{ImageMetadata, MediaProbe};
use crate::domain::file::SelectedFile;
use crate::domain::window::WindowState;
use crate::domain::youtube::VideoInfo;

/// `dialog:open`. A cancel is a success with `canceled: true` and no files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogOpenData {
    pub files: Vec<SelectedFile>,
    pub canceled: bool,
}

/// `window:get-state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStateData {
    pub state: WindowState,
}

/// Why a path did not validate. Reported inside a success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
}

/// `files:validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateData {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SelectedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMetadata {
    pub name: String,
    pub size: u64,
    pub extension: String,
    pub mime_type: String,
    pub last_modified: i64,
    /// `0` where the filesystem does not record creation time.
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub basic: BasicMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaProbe>,
}

/// `files:get-metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadataData {
    pub metadata: FileMetadata,
}

/// `image:get-metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadataData {
    pub metadata: ImageMetadata,
}

/// `image:convert` and `video:convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPathData {
    pub output_path: String,
}

/// `youtube:get-info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfoData {
    pub info: VideoInfo,
}

/// `youtube:download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadData {
    pub file_path: String,
}
