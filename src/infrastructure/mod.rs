// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the traits in `application::port`, wrapping the
//! native dialog, the `image` codecs and the external `ffmpeg`/`yt-dlp`
//! binaries.
//!
//! # Available Adapters
//!
//! - [`dialog`]: native picker via `rfd` (implements [`FileDialog`])
//! - [`window`]: host-side window lifecycle (implements [`WindowController`])
//! - [`image`]: re-encoding via `image` (implements [`ImageProcessor`])
//! - [`ffmpeg`]: transcoding via the `ffmpeg` binary (implements [`VideoTranscoder`])
//! - [`ytdlp`]: extraction via the `yt-dlp` binary (implements [`VideoExtractor`])
//! - [`tool`]: binary discovery shared by the subprocess adapters
//!
//! [`FileDialog`]: crate::application::port::FileDialog
//! [`WindowController`]: crate::application::port::WindowController
//! [`ImageProcessor`]: crate::application::port::ImageProcessor
//! [`VideoTranscoder`]: crate::application::port::VideoTranscoder
//! [`VideoExtractor`]: crate::application::port::VideoExtractor

pub mod dialog;
pub mod ffmpeg;
pub mod image;
pub mod tool;
pub mod window;
pub mod ytdlp;

pub use dialog::RfdFileDialog;
pub use ffmpeg::FfmpegTranscoder;
pub use image::ImageRsProcessor;
pub use window::TrackedWindow;
pub use ytdlp::YtDlpExtractor;
