// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for the privileged side's collaborators.
//!
//! Handlers only see these traits. Infrastructure adapters wrap the native
//! dialog, the window, the image codec library and the two external binaries;
//! tests substitute fakes.
//!
//! # Available Ports
//!
//! - [`dialog`]: native file picker
//! - [`window`]: window lifecycle and bounds
//! - [`image`]: image probing and re-encoding
//! - [`transcode`]: video transcoding and media probing (`ffmpeg`)
//! - [`extract`]: remote video description and download (`yt-dlp`)
//!
//! # Design Notes
//!
//! - Traits take and return domain types only
//! - All ports are `Send + Sync` so the context can be shared across tasks
//! - Long-running operations return a boxed future; nothing blocks the runtime

pub mod dialog;
pub mod extract;
pub mod image;
pub mod transcode;
pub mod window;

pub use dialog::{DialogError, DialogRequest, FileDialog};
pub use extract::{DownloadJob, ExtractError, VideoExtractor};
pub use image::{ImageError, ImageJob, ImageMetadata, ImageProcessor};
pub use transcode::{MediaProbe, TranscodeError, TranscodeJob, VideoTranscoder};
pub use window::{WindowController, WindowError};
