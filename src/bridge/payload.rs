// SPDX-License-Identifier: MPL-2.0
//! Channel payloads and their validation.
//!
//! The presentation process is less trusted than the host, so every payload
//! is decoded from raw JSON against its channel's schema (unknown fields are
//! rejected) and then checked semantically. Only a fully validated
//! [`CallRequest`] or [`SignalRequest`] reaches a handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::channel::Channel;
use super::error::BridgeError;
use crate::domain::conversion::{
    ConversionOptions, ImageConvertOptions, ImageFormat, ImageQuality, Resolution,
    SubtitleFormat, SubtitleOptions, VideoContainer, VideoQuality,
};
use crate::domain::file::FileFilter;
use crate::domain::navigation::ToolType;
use crate::domain::youtube::DownloadFormat;

/// Codec names, bitrates and similar tokens handed to external tools.
static TOOL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:\-]{0,63}$").expect("token regex should compile")
});

const MAX_TITLE_LEN: usize = 256;
const MAX_URL_LEN: usize = 2048;

// =============================================================================
// Wire payloads
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DialogOpenPayload {
    pub title: String,
    pub multiple: bool,
    #[serde(default)]
    pub filters: Vec<FileFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilePathPayload {
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetToolPayload {
    pub tool: ToolType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageOptionsPayload {
    pub format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageConvertPayload {
    pub file_path: String,
    pub options: ImageOptionsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VideoOptionsPayload {
    pub format: VideoContainer,
    /// `null`/absent means "same as source".
    #[serde(default)]
    pub quality: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubtitlePayload {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub format: Option<SubtitleFormat>,
    #[serde(default)]
    pub burn_in: bool,
    #[serde(default)]
    pub force_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VideoConvertPayload {
    pub file_path: String,
    pub options: VideoOptionsPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<SubtitlePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct YoutubeDownloadPayload {
    pub url: String,
    pub format: DownloadFormat,
    /// Maximum video height, e.g. `"720"`. Ignored for mp3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

// =============================================================================
// Validated requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConvertRequest {
    pub input: PathBuf,
    pub options: ConversionOptions,
    pub subtitle: Option<SubtitleOptions>,
    pub output_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub format: DownloadFormat,
    pub max_height: Option<u32>,
    pub output_path: Option<PathBuf>,
}

/// A call-channel request whose payload passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallRequest {
    DialogOpen(DialogOpenPayload),
    WindowGetState,
    FilesValidate { path: PathBuf },
    FilesGetMetadata { path: PathBuf },
    NavigationGetTool,
    ImageGetMetadata { path: PathBuf },
    ImageConvert { path: PathBuf, options: ImageConvertOptions },
    VideoConvert(VideoConvertRequest),
    YoutubeGetInfo { url: String },
    YoutubeDownload(DownloadRequest),
}

/// A signal-channel message whose payload passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalRequest {
    WindowMinimize,
    WindowMaximize,
    WindowUnmaximize,
    WindowClose,
    NavigationSetTool(ToolType),
}

fn parse<T: serde::de::DeserializeOwned>(channel: Channel, payload: Value) -> Result<T, BridgeError> {
    serde_json::from_value(payload).map_err(|err| {
        BridgeError::validation(format!("invalid payload for {channel}: {err}"))
            .with_details(serde_json::json!({ "channel": channel.name() }))
    })
}

/// Channels with no payload accept `{}` or `null`.
fn parse_empty(channel: Channel, payload: Value) -> Result<(), BridgeError> {
    if payload.is_null() {
        return Ok(());
    }
    parse::<EmptyPayload>(channel, payload).map(|_| ())
}

fn require_path(field: &str, raw: &str) -> Result<PathBuf, BridgeError> {
    if raw.trim().is_empty() {
        return Err(BridgeError::validation(format!("{field} must not be empty")));
    }
    if raw.contains('\0') {
        return Err(BridgeError::validation(format!("{field} contains a NUL byte")));
    }
    Ok(PathBuf::from(raw))
}

fn optional_path(field: &str, raw: Option<&str>) -> Result<Option<PathBuf>, BridgeError> {
    raw.map(|r| require_path(field, r)).transpose()
}

fn require_token(field: &str, raw: &str) -> Result<String, BridgeError> {
    if TOOL_TOKEN.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(BridgeError::validation(format!("{field} '{raw}' is not allowed")))
    }
}

/// Accepts only absolute http(s) URLs without whitespace.
pub fn validate_url(raw: &str) -> Result<String, BridgeError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(BridgeError::validation("URL is required"));
    }
    if url.len() > MAX_URL_LEN {
        return Err(BridgeError::validation("URL is too long"));
    }
    let has_scheme = url.starts_with("https://") || url.starts_with("http://");
    if !has_scheme || url.chars().any(char::is_whitespace) {
        return Err(BridgeError::validation(format!("'{url}' is not an http(s) URL")));
    }
    Ok(url.to_string())
}

fn validate_dialog(payload: DialogOpenPayload) -> Result<DialogOpenPayload, BridgeError> {
    if payload.title.chars().count() > MAX_TITLE_LEN {
        return Err(BridgeError::validation("dialog title is too long"));
    }
    for filter in &payload.filters {
        if filter.extensions.is_empty() {
            return Err(BridgeError::validation(format!(
                "filter '{}' lists no extensions",
                filter.name
            )));
        }
        let bad = filter.extensions.iter().find(|ext| {
            ext.is_empty() || ext.contains(['/', '\\', '\0']) || ext.len() > 16
        });
        if let Some(ext) = bad {
            return Err(BridgeError::validation(format!(
                "filter '{}' has invalid extension '{ext}'",
                filter.name
            )));
        }
    }
    if let Some(path) = &payload.default_path {
        require_path("defaultPath", path)?;
    }
    Ok(payload)
}

fn validate_image_convert(payload: ImageConvertPayload) -> Result<CallRequest, BridgeError> {
    let path = require_path("filePath", &payload.file_path)?;
    let opts = payload.options;
    let quality = opts
        .quality
        .map(|q| {
            ImageQuality::new(q)
                .ok_or_else(|| BridgeError::validation(format!("quality {q} is outside 1..=100")))
        })
        .transpose()?;
    if opts.width == Some(0) || opts.height == Some(0) {
        return Err(BridgeError::validation("width and height must be positive"));
    }
    Ok(CallRequest::ImageConvert {
        path,
        options: ImageConvertOptions {
            format: opts.format,
            quality,
            output_path: optional_path("outputPath", opts.output_path.as_deref())?,
            width: opts.width,
            height: opts.height,
        },
    })
}

fn validate_video_convert(payload: VideoConvertPayload) -> Result<CallRequest, BridgeError> {
    let input = require_path("filePath", &payload.file_path)?;
    let opts = payload.options;

    let quality = VideoQuality::from_wire(opts.quality).map_err(|q| {
        BridgeError::validation(format!(
            "quality {q} is not a preset (360, 480, 720, 1080 or null for source)"
        ))
    })?;
    if let Some(res) = opts.resolution {
        if res.width == Some(0) || res.height == Some(0) {
            return Err(BridgeError::validation("resolution must be positive"));
        }
    }
    let defaults = ConversionOptions::default();
    let options = ConversionOptions {
        format: opts.format,
        quality,
        resolution: opts.resolution,
        bitrate: opts.bitrate.as_deref().map(|b| require_token("bitrate", b)).transpose()?,
        codec: match opts.codec.as_deref() {
            Some(c) => require_token("codec", c)?,
            None => defaults.codec,
        },
        audio_codec: match opts.audio_codec.as_deref() {
            Some(c) => require_token("audioCodec", c)?,
            None => defaults.audio_codec,
        },
    };

    let subtitle = match payload.subtitle {
        Some(sub) => match sub.path.as_deref() {
            Some(raw) => {
                if sub.force_style.as_deref().is_some_and(|s| s.contains(['\'', '\n'])) {
                    return Err(BridgeError::validation("forceStyle contains forbidden characters"));
                }
                Some(SubtitleOptions {
                    path: require_path("subtitle.path", raw)?,
                    format: sub.format,
                    burn_in: sub.burn_in,
                    force_style: sub.force_style,
                })
            }
            None => None,
        },
        None => None,
    };

    Ok(CallRequest::VideoConvert(VideoConvertRequest {
        input,
        options,
        subtitle,
        output_directory: optional_path("outputDirectory", payload.output_directory.as_deref())?,
    }))
}

fn validate_download(payload: YoutubeDownloadPayload) -> Result<CallRequest, BridgeError> {
    let url = validate_url(&payload.url)?;
    let max_height = match payload.quality.as_deref() {
        None | Some("") | Some("best") => None,
        Some(q) => Some(
            q.trim_end_matches('p')
                .parse::<u32>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| BridgeError::validation(format!("quality '{q}' is not a height")))?,
        ),
    };
    Ok(CallRequest::YoutubeDownload(DownloadRequest {
        url,
        format: payload.format,
        max_height,
        output_path: optional_path("outputPath", payload.output_path.as_deref())?,
    }))
}

impl CallRequest {
    /// Decodes and validates the payload of a call channel.
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION_ERROR` when the channel is a signal channel or the
    /// payload does not match its schema.
    pub fn decode(channel: Channel, payload: Value) -> Result<Self, BridgeError> {
        match channel {
            Channel::DialogOpen => parse(channel, payload)
                .and_then(validate_dialog)
                .map(CallRequest::DialogOpen),
            Channel::WindowGetState => {
                parse_empty(channel, payload).map(|()| CallRequest::WindowGetState)
            }
            Channel::NavigationGetTool => {
                parse_empty(channel, payload).map(|()| CallRequest::NavigationGetTool)
            }
            Channel::FilesValidate | Channel::FilesGetMetadata | Channel::ImageGetMetadata => {
                let p: FilePathPayload = parse(channel, payload)?;
                let path = require_path("filePath", &p.file_path)?;
                Ok(match channel {
                    Channel::FilesValidate => CallRequest::FilesValidate { path },
                    Channel::FilesGetMetadata => CallRequest::FilesGetMetadata { path },
                    _ => CallRequest::ImageGetMetadata { path },
                })
            }
            Channel::ImageConvert => parse(channel, payload).and_then(validate_image_convert),
            Channel::VideoConvert => parse(channel, payload).and_then(validate_video_convert),
            Channel::YoutubeGetInfo => {
                let p: UrlPayload = parse(channel, payload)?;
                Ok(CallRequest::YoutubeGetInfo {
                    url: validate_url(&p.url)?,
                })
            }
            Channel::YoutubeDownload => parse(channel, payload).and_then(validate_download),
            Channel::WindowMinimize
            | Channel::WindowMaximize
            | Channel::WindowUnmaximize
            | Channel::WindowClose
            | Channel::NavigationSetTool => Err(BridgeError::validation(format!(
                "{channel} is a signal channel and cannot be called"
            ))),
        }
    }
}

impl SignalRequest {
    /// Decodes and validates the payload of a signal channel.
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION_ERROR` when the channel is a call channel or the
    /// payload does not match its schema.
    pub fn decode(channel: Channel, payload: Value) -> Result<Self, BridgeError> {
        match channel {
            Channel::WindowMinimize => parse_empty(channel, payload).map(|()| Self::WindowMinimize),
            Channel::WindowMaximize => parse_empty(channel, payload).map(|()| Self::WindowMaximize),
            Channel::WindowUnmaximize => {
                parse_empty(channel, payload).map(|()| Self::WindowUnmaximize)
            }
            Channel::WindowClose => parse_empty(channel, payload).map(|()| Self::WindowClose),
            Channel::NavigationSetTool => {
                let p: SetToolPayload = parse(channel, payload)?;
                Ok(Self::NavigationSetTool(p.tool))
            }
            _ => Err(BridgeError::validation(format!(
                "{channel} is a call channel and cannot be sent as a signal"
            ))),
        }
    }
}
