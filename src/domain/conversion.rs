// SPDX-License-Identifier: MPL-2.0
//! Conversion option value objects.
//!
//! These are the validated forms of what the presentation side sends with
//! `image:convert` and `video:convert`. They carry no identity and are built
//! fresh for every call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{MAX_IMAGE_QUALITY, MIN_IMAGE_QUALITY};

// =============================================================================
// Images
// =============================================================================

/// Target format for `image:convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
    Avif,
    Bmp,
    Tiff,
    Ico,
}

impl ImageFormat {
    /// File extension written for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Ico => "ico",
        }
    }

    /// Whether the encoder honours a quality setting.
    #[must_use]
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg | ImageFormat::Avif)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Jpeg => "jpeg",
            other => other.extension(),
        })
    }
}

/// Encoder quality in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageQuality(u8);

impl ImageQuality {
    /// Returns `None` when `value` is outside `1..=100`.
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (MIN_IMAGE_QUALITY..=MAX_IMAGE_QUALITY).contains(v))
            .map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        Self(crate::config::DEFAULT_IMAGE_QUALITY)
    }
}

/// Validated options for one image conversion.
///
/// `quality` is `None` when the caller left it out; the configured default
/// then applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConvertOptions {
    pub format: ImageFormat,
    pub quality: Option<ImageQuality>,
    pub output_path: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageConvertOptions {
    #[must_use]
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            quality: None,
            output_path: None,
            width: None,
            height: None,
        }
    }
}

/// Where an image conversion writes.
///
/// Without an explicit path the result lands next to the input as
/// `<stem>_converted.<ext>`. An explicit path keeps its directory and stem but
/// always carries the target extension.
#[must_use]
pub fn image_output_path(input: &Path, format: ImageFormat, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.with_extension(format.extension()),
        None => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let dir = input.parent().unwrap_or_else(|| Path::new(""));
            dir.join(format!("{stem}_converted.{}", format.extension()))
        }
    }
}

// =============================================================================
// Video
// =============================================================================

/// Output container for `video:convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    #[default]
    Mp4,
    Webm,
    Mkv,
    Avi,
}

impl VideoContainer {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Webm => "webm",
            VideoContainer::Mkv => "mkv",
            VideoContainer::Avi => "avi",
        }
    }
}

/// Resolution presets the quality selector offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPreset {
    P360,
    P480,
    P720,
    P1080,
}

impl ResolutionPreset {
    #[must_use]
    pub fn from_lines(lines: u32) -> Option<Self> {
        match lines {
            360 => Some(Self::P360),
            480 => Some(Self::P480),
            720 => Some(Self::P720),
            1080 => Some(Self::P1080),
            _ => None,
        }
    }

    /// x264 constant rate factor used for this preset.
    #[must_use]
    pub fn crf(self) -> u8 {
        match self {
            Self::P360 => 28,
            Self::P480 => 26,
            Self::P720 => 23,
            Self::P1080 => 20,
        }
    }
}

/// Video quality selection.
///
/// On the wire a `null` or missing quality means "same as source"; it is
/// decoded to [`VideoQuality::PreserveSource`] rather than guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    #[default]
    PreserveSource,
    Preset(ResolutionPreset),
}

impl VideoQuality {
    /// Decodes the wire value.
    ///
    /// # Errors
    ///
    /// Returns the rejected number when it is not a known preset.
    pub fn from_wire(value: Option<u32>) -> Result<Self, u32> {
        match value {
            None => Ok(Self::PreserveSource),
            Some(lines) => ResolutionPreset::from_lines(lines)
                .map(Self::Preset)
                .ok_or(lines),
        }
    }

    #[must_use]
    pub fn crf(self) -> Option<u8> {
        match self {
            Self::PreserveSource => None,
            Self::Preset(preset) => Some(preset.crf()),
        }
    }
}

/// Target frame size. Missing sides keep the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Resolution {
    /// `ffmpeg` scale filter, or `None` when no side is set.
    #[must_use]
    pub fn scale_filter(self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("scale={w}:{h}")),
            (Some(w), None) => Some(format!("scale={w}:-2")),
            (None, Some(h)) => Some(format!("scale=-2:{h}")),
            (None, None) => None,
        }
    }
}

/// Validated options for one video conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    pub format: VideoContainer,
    pub quality: VideoQuality,
    pub resolution: Option<Resolution>,
    pub bitrate: Option<String>,
    pub codec: String,
    pub audio_codec: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            format: VideoContainer::default(),
            quality: VideoQuality::default(),
            resolution: None,
            bitrate: None,
            codec: crate::config::DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: crate::config::DEFAULT_AUDIO_CODEC.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Ass,
    Vtt,
}

/// Subtitle track to attach or burn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOptions {
    pub path: PathBuf,
    pub format: Option<SubtitleFormat>,
    pub burn_in: bool,
    pub force_style: Option<String>,
}

/// Where a video conversion writes: `<dir>/<stem>.<ext>`, with `_converted`
/// appended to the stem if that would overwrite the input.
#[must_use]
pub fn video_output_path(
    input: &Path,
    container: VideoContainer,
    output_dir: Option<&Path>,
) -> PathBuf {
    let dir = output_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""));
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let candidate = dir.join(format!("{stem}.{}", container.extension()));
    if candidate == input {
        with_converted_suffix(&candidate)
    } else {
        candidate
    }
}

/// `<dir>/<stem>_converted.<ext>` for `path`.
#[must_use]
pub fn with_converted_suffix(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_converted.{}", ext.to_string_lossy()),
        None => format!("{stem}_converted"),
    };
    path.with_file_name(name)
}
