// SPDX-License-Identifier: MPL-2.0
//! Image probing and re-encoding port.
//!
//! The encoder itself belongs to the wrapped codec library; this port only
//! describes what the bridge asks of it.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::domain::conversion::ImageConvertOptions;

// =============================================================================
// ImageError
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The input does not exist.
    NotFound(PathBuf),
    /// The input could not be decoded.
    Decode(String),
    /// The encoder rejected the image or options.
    Encode(String),
    /// Reading or writing failed.
    Io(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            ImageError::Decode(msg) => write!(f, "Failed to decode image: {msg}"),
            ImageError::Encode(msg) => write!(f, "Failed to encode image: {msg}"),
            ImageError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Io(err.to_string())
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// Header facts about an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Lowercase format name, e.g. `"png"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Bytes on disk.
    pub size: u64,
}

/// One conversion, with the output path already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: ImageConvertOptions,
}

// =============================================================================
// ImageProcessor Trait
// =============================================================================

pub trait ImageProcessor: Send + Sync {
    /// Reads dimensions and format without decoding pixel data.
    fn metadata(&self, path: PathBuf) -> BoxFuture<'_, Result<ImageMetadata, ImageError>>;

    /// Re-encodes `job.input` into `job.output`. Resolves to the written path.
    fn convert(&self, job: ImageJob) -> BoxFuture<'_, Result<PathBuf, ImageError>>;
}
