// SPDX-License-Identifier: MPL-2.0
//! Video descriptions returned by the extraction tool.

use serde::{Deserialize, Serialize};

/// What `youtube:download` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    /// Best video + best audio merged into an mp4.
    Mp4,
    /// Audio only, transcoded to mp3.
    Mp3,
}

impl DownloadFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            DownloadFormat::Mp4 => "mp4",
            DownloadFormat::Mp3 => "mp3",
        }
    }
}

/// One downloadable stream variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    pub format_id: String,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    pub has_video: bool,
    pub has_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Seconds.
    pub duration: f64,
    pub thumbnail: String,
    pub uploader: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub formats: Vec<StreamFormat>,
}
