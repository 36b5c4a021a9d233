// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg` adapter implementing the [`VideoTranscoder`] port trait.
//!
//! Conversions run the `ffmpeg` binary as a child process; probing runs
//! `ffprobe` with JSON output. Argument construction is a pure function so it
//! can be tested without either binary installed.
//!
//! # Design Notes
//!
//! - The child never inherits stdin: the host's stdin carries the bridge protocol
//! - Children are killed if the awaiting task is dropped
//! - Only the tail of stderr is kept for error messages
//!
//! [`VideoTranscoder`]: crate::application::port::VideoTranscoder

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::application::port::{MediaProbe, TranscodeError, TranscodeJob, VideoTranscoder};
use crate::config::{DEFAULT_AUDIO_CODEC, DEFAULT_VIDEO_CODEC};
use crate::domain::conversion::{SubtitleFormat, SubtitleOptions, VideoContainer};
use crate::infrastructure::tool::{tail_lines, Tool};

const STDERR_TAIL_LINES: usize = 6;

/// Subprocess-backed transcoder.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl FfmpegTranscoder {
    #[must_use]
    pub fn new(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Locates both binaries, preferring a configured `ffmpeg` path.
    #[must_use]
    pub fn discover(configured_ffmpeg: Option<&Path>) -> Self {
        let transcoder = Self::new(
            Tool::Ffmpeg.locate(configured_ffmpeg),
            Tool::locate_ffprobe(configured_ffmpeg),
        );
        match &transcoder.ffmpeg {
            Some(path) => log::info!("Using ffmpeg at {}", path.display()),
            None => log::warn!("ffmpeg not found; video conversion is unavailable"),
        }
        transcoder
    }

    async fn run_transcode(&self, job: TranscodeJob) -> Result<PathBuf, TranscodeError> {
        let ffmpeg = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| TranscodeError::ToolMissing(Tool::Ffmpeg.program().into()))?;
        if !tokio::fs::try_exists(&job.input).await.unwrap_or(false) {
            return Err(TranscodeError::Io(format!(
                "input file not found: {}",
                job.input.display()
            )));
        }

        let args = build_args(&job);
        log::debug!("Running ffmpeg with {} arguments", args.len());
        let output = Command::new(ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                status: output.status.code(),
                stderr: tail_lines(&output.stderr, STDERR_TAIL_LINES),
            });
        }
        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(TranscodeError::Failed {
                status: output.status.code(),
                stderr: "output file was not created".into(),
            });
        }
        Ok(job.output)
    }

    async fn run_probe(&self, path: PathBuf) -> Result<MediaProbe, TranscodeError> {
        let ffprobe = self
            .ffprobe
            .as_ref()
            .ok_or_else(|| TranscodeError::ToolMissing(Tool::Ffprobe.program().into()))?;
        let output = Command::new(ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() {
            return Err(TranscodeError::Probe(tail_lines(&output.stderr, 1)));
        }
        parse_probe(&output.stdout)
    }
}

impl VideoTranscoder for FfmpegTranscoder {
    fn transcode(&self, job: TranscodeJob) -> BoxFuture<'_, Result<PathBuf, TranscodeError>> {
        self.run_transcode(job).boxed()
    }

    fn probe(&self, path: PathBuf) -> BoxFuture<'_, Result<MediaProbe, TranscodeError>> {
        self.run_probe(path).boxed()
    }
}

// =============================================================================
// Argument construction
// =============================================================================

/// Full `ffmpeg` argument list for a job, output path last.
#[must_use]
pub fn build_args(job: &TranscodeJob) -> Vec<OsString> {
    let opts = &job.options;
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-i".into(), job.input.clone().into()];

    let soft_subtitle = job.subtitle.as_ref().filter(|s| !s.burn_in);
    if let Some(sub) = soft_subtitle {
        args.push("-i".into());
        args.push(sub.path.clone().into());
    }

    let (video_codec, audio_codec) = codecs_for(opts.format, &opts.codec, &opts.audio_codec);
    args.push("-c:v".into());
    args.push(video_codec.into());

    if let Some(crf) = opts.quality.crf() {
        args.push("-crf".into());
        args.push(crf.to_string().into());
    }

    let mut filters = Vec::new();
    if let Some(scale) = opts.resolution.and_then(|r| r.scale_filter()) {
        filters.push(scale);
    }
    if let Some(sub) = job.subtitle.as_ref().filter(|s| s.burn_in) {
        filters.push(burn_in_filter(sub));
    }
    if !filters.is_empty() {
        args.push("-vf".into());
        args.push(filters.join(",").into());
    }

    args.push("-c:a".into());
    args.push(audio_codec.into());

    if let Some(bitrate) = &opts.bitrate {
        args.push("-b:v".into());
        args.push(bitrate.into());
    }

    if soft_subtitle.is_some() {
        for arg in ["-c:s", subtitle_codec(opts.format), "-map", "0", "-map", "1"] {
            args.push(arg.into());
        }
    }

    if opts.format == VideoContainer::Mp4 {
        args.push("-movflags".into());
        args.push("+faststart".into());
    }

    args.push("-y".into());
    args.push(job.output.clone().into());
    args
}

/// WebM only carries VP8/VP9/AV1 with Vorbis/Opus, so the H.264/AAC defaults
/// are swapped when the caller did not pick codecs explicitly.
fn codecs_for<'a>(container: VideoContainer, video: &'a str, audio: &'a str) -> (&'a str, &'a str) {
    if container != VideoContainer::Webm {
        return (video, audio);
    }
    let video = if video == DEFAULT_VIDEO_CODEC { "libvpx-vp9" } else { video };
    let audio = if audio == DEFAULT_AUDIO_CODEC { "libopus" } else { audio };
    (video, audio)
}

fn subtitle_codec(container: VideoContainer) -> &'static str {
    match container {
        VideoContainer::Mp4 => "mov_text",
        VideoContainer::Webm => "webvtt",
        VideoContainer::Mkv | VideoContainer::Avi => "srt",
    }
}

/// Quotes a path for use inside a filtergraph argument.
fn quote_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let escaped = raw.replace('\\', "\\\\").replace('\'', "'\\''");
    format!("'{escaped}'")
}

fn burn_in_filter(sub: &SubtitleOptions) -> String {
    let path = quote_filter_path(&sub.path);
    let is_ass = sub.format == Some(SubtitleFormat::Ass)
        || sub
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ass"));
    match (is_ass, sub.force_style.as_deref()) {
        (true, Some(style)) => format!("ass={path}:force_style='{style}'"),
        (true, None) => format!("ass={path}"),
        (false, Some(style)) => format!("subtitles={path}:force_style='{style}'"),
        (false, None) => format!("subtitles={path}"),
    }
}

// =============================================================================
// Probe parsing
// =============================================================================

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

fn parse_probe(stdout: &[u8]) -> Result<MediaProbe, TranscodeError> {
    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| TranscodeError::Probe(e.to_string()))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let format = parsed.format.as_ref();
    Ok(MediaProbe {
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        duration: format
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse().ok()),
        bitrate: format
            .and_then(|f| f.bit_rate.as_deref())
            .and_then(|b| b.parse().ok()),
        // ffprobe reports aliases such as "mov,mp4,m4a,3gp,3g2,mj2"; keep the first.
        format: format
            .and_then(|f| f.format_name.as_deref())
            .and_then(|n| n.split(',').next())
            .map(str::to_string),
    })
}
