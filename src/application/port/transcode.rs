// SPDX-License-Identifier: MPL-2.0
//! Video transcoding port.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::domain::conversion::{ConversionOptions, SubtitleOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// The transcoder binary could not be located.
    ToolMissing(String),
    /// The transcoder ran and exited unsuccessfully.
    Failed {
        status: Option<i32>,
        /// Tail of the tool's stderr.
        stderr: String,
    },
    /// Probing the input failed.
    Probe(String),
    /// Spawning or talking to the process failed.
    Io(String),
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeError::ToolMissing(tool) => {
                write!(f, "{tool} was not found; install it or set its path in settings")
            }
            TranscodeError::Failed { status, stderr } => match status {
                Some(code) => write!(f, "Transcoder exited with status {code}: {stderr}"),
                None => write!(f, "Transcoder was terminated: {stderr}"),
            },
            TranscodeError::Probe(msg) => write!(f, "Failed to probe media: {msg}"),
            TranscodeError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for TranscodeError {}

impl From<std::io::Error> for TranscodeError {
    fn from(err: std::io::Error) -> Self {
        TranscodeError::Io(err.to_string())
    }
}

/// One video conversion, with the output path already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: ConversionOptions,
    pub subtitle: Option<SubtitleOptions>,
}

/// Stream facts reported by the prober. Every field is optional because
/// containers differ in what they declare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Bits per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

pub trait VideoTranscoder: Send + Sync {
    /// Runs the conversion to completion. Resolves to the written path.
    fn transcode(&self, job: TranscodeJob) -> BoxFuture<'_, Result<PathBuf, TranscodeError>>;

    /// Describes an audio or video file.
    fn probe(&self, path: PathBuf) -> BoxFuture<'_, Result<MediaProbe, TranscodeError>>;
}
