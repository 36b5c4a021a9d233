// SPDX-License-Identifier: MPL-2.0
//! Remote video extraction port.

use futures_util::future::BoxFuture;
use std::fmt;
use std::path::PathBuf;

use crate::domain::youtube::{DownloadFormat, VideoInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The extractor binary could not be located.
    ToolMissing(String),
    /// The site refused the request as automated traffic.
    BotDetected,
    /// The video is private, removed or region-locked.
    Unavailable,
    /// Any other extractor failure, with its last stderr line.
    Failed(String),
    /// The extractor printed something that is not a video description.
    Parse(String),
    /// Spawning or talking to the process failed.
    Io(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ToolMissing(tool) => {
                write!(f, "{tool} was not found; install it or set its path in settings")
            }
            ExtractError::BotDetected => write!(
                f,
                "YouTube is blocking the request (Bot Detection). Please try again in 5 minutes."
            ),
            ExtractError::Unavailable => write!(f, "The video is private or unavailable."),
            ExtractError::Failed(msg) => write!(f, "{msg}"),
            ExtractError::Parse(msg) => write!(f, "Unexpected extractor output: {msg}"),
            ExtractError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io(err.to_string())
    }
}

/// One download, with the output path already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: String,
    pub format: DownloadFormat,
    /// Cap on video height; `None` takes the best available.
    pub max_height: Option<u32>,
    pub output: PathBuf,
}

pub trait VideoExtractor: Send + Sync {
    fn info(&self, url: String) -> BoxFuture<'_, Result<VideoInfo, ExtractError>>;

    /// Downloads to `job.output`. Resolves to the written path.
    fn download(&self, job: DownloadJob) -> BoxFuture<'_, Result<PathBuf, ExtractError>>;
}
