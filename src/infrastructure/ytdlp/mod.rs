// SPDX-License-Identifier: MPL-2.0
//! `yt-dlp` adapter implementing the [`VideoExtractor`] port trait.
//!
//! `info` runs the extractor in single-JSON mode and maps the document to
//! [`VideoInfo`]; `download` lets the extractor write the file itself. Known
//! stderr signatures are classified so the user gets an actionable message
//! instead of a raw traceback.
//!
//! [`VideoExtractor`]: crate::application::port::VideoExtractor

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::application::port::{DownloadJob, ExtractError, VideoExtractor};
use crate::domain::youtube::{DownloadFormat, StreamFormat, VideoInfo};
use crate::infrastructure::tool::{tail_lines, Tool};

const REFERER_HEADER: &str = "referer:youtube.com";
const USER_AGENT_HEADER: &str = "user-agent:Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BOT_CHECK_SIGNATURE: &str = "Sign in to confirm you are not a bot";
const UNAVAILABLE_SIGNATURE: &str = "Video unavailable";

#[derive(Debug, Clone, Default)]
pub struct YtDlpExtractor {
    binary: Option<PathBuf>,
}

impl YtDlpExtractor {
    #[must_use]
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }

    #[must_use]
    pub fn discover(configured: Option<&Path>) -> Self {
        let extractor = Self::new(Tool::YtDlp.locate(configured));
        match &extractor.binary {
            Some(path) => log::info!("Using yt-dlp at {}", path.display()),
            None => log::warn!("yt-dlp not found; YouTube features are unavailable"),
        }
        extractor
    }

    fn binary(&self) -> Result<&Path, ExtractError> {
        self.binary
            .as_deref()
            .ok_or_else(|| ExtractError::ToolMissing(Tool::YtDlp.program().into()))
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Vec<u8>, ExtractError> {
        let output = Command::new(self.binary()?)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(classify_failure(&output.stderr))
        }
    }

    async fn fetch_info(&self, url: String) -> Result<VideoInfo, ExtractError> {
        let stdout = self.run(info_args(&url)).await?;
        let info = parse_info(&stdout)?;
        log::info!("Fetched video info for id {}", info.id);
        Ok(info)
    }

    async fn fetch_download(&self, job: DownloadJob) -> Result<PathBuf, ExtractError> {
        self.run(download_args(&job)).await?;
        Ok(job.output)
    }
}

impl VideoExtractor for YtDlpExtractor {
    fn info(&self, url: String) -> BoxFuture<'_, Result<VideoInfo, ExtractError>> {
        self.fetch_info(url).boxed()
    }

    fn download(&self, job: DownloadJob) -> BoxFuture<'_, Result<PathBuf, ExtractError>> {
        self.fetch_download(job).boxed()
    }
}

// =============================================================================
// Arguments
// =============================================================================

#[must_use]
pub fn info_args(url: &str) -> Vec<OsString> {
    [
        "--dump-single-json",
        "--no-check-certificates",
        "--no-warnings",
        "--prefer-free-formats",
        "--add-header",
        REFERER_HEADER,
        "--add-header",
        USER_AGENT_HEADER,
        url,
    ]
    .into_iter()
    .map(OsString::from)
    .collect()
}

#[must_use]
pub fn download_args(job: &DownloadJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--no-check-certificates".into(),
        "--no-playlist".into(),
        "-o".into(),
        job.output.clone().into(),
    ];
    match job.format {
        DownloadFormat::Mp3 => {
            for arg in ["-x", "--audio-format", "mp3", "--audio-quality", "0"] {
                args.push(arg.into());
            }
        }
        DownloadFormat::Mp4 => {
            let selector = match job.max_height {
                Some(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
                None => "bestvideo+bestaudio/best".to_string(),
            };
            args.push("-f".into());
            args.push(selector.into());
            args.push("--merge-output-format".into());
            args.push("mp4".into());
        }
    }
    args.push(job.url.clone().into());
    args
}

// =============================================================================
// Output handling
// =============================================================================

/// Maps extractor stderr to an error, recognizing bot checks and unavailable
/// videos.
#[must_use]
pub fn classify_failure(stderr: &[u8]) -> ExtractError {
    let text = String::from_utf8_lossy(stderr);
    if text.contains(BOT_CHECK_SIGNATURE) {
        ExtractError::BotDetected
    } else if text.contains(UNAVAILABLE_SIGNATURE) {
        ExtractError::Unavailable
    } else {
        let tail = tail_lines(stderr, 1);
        ExtractError::Failed(if tail.is_empty() {
            "yt-dlp failed without output".to_string()
        } else {
            tail
        })
    }
}

#[derive(Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    uploader: Option<String>,
    view_count: Option<u64>,
    description: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    resolution: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
    vcodec: Option<String>,
    acodec: Option<String>,
}

impl From<RawFormat> for StreamFormat {
    fn from(raw: RawFormat) -> Self {
        let resolution = raw.resolution.or_else(|| match (raw.width, raw.height) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            _ => None,
        });
        StreamFormat {
            format_id: raw.format_id.unwrap_or_default(),
            extension: raw.ext.unwrap_or_default(),
            resolution,
            filesize: raw.filesize.or(raw.filesize_approx),
            has_video: raw.vcodec.as_deref() != Some("none"),
            has_audio: raw.acodec.as_deref() != Some("none"),
        }
    }
}

/// Maps the single-JSON document to [`VideoInfo`], filling display defaults.
///
/// # Errors
///
/// Returns [`ExtractError::Parse`] for empty or non-JSON output.
pub fn parse_info(stdout: &[u8]) -> Result<VideoInfo, ExtractError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(ExtractError::Parse("empty response".into()));
    }
    let raw: RawInfo =
        serde_json::from_slice(stdout).map_err(|e| ExtractError::Parse(e.to_string()))?;
    Ok(VideoInfo {
        id: raw.id.unwrap_or_default(),
        title: raw.title.unwrap_or_else(|| "Unknown Video".to_string()),
        duration: raw.duration.unwrap_or(0.0),
        thumbnail: raw.thumbnail.unwrap_or_default(),
        uploader: raw.uploader.unwrap_or_else(|| "Unknown".to_string()),
        views: raw.view_count,
        description: raw.description,
        formats: raw.formats.into_iter().map(StreamFormat::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn info_args_request_single_json_with_headers() {
        let args = strings(&info_args("https://youtu.be/abc"));
        assert_eq!(args[0], "--dump-single-json");
        assert!(args.contains(&"--prefer-free-formats".to_string()));
        assert!(args.contains(&REFERER_HEADER.to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[test]
    fn mp3_download_extracts_audio() {
        let job = DownloadJob {
            url: "https://youtu.be/abc".into(),
            format: DownloadFormat::Mp3,
            max_height: Some(720),
            output: PathBuf::from("/dl/song.mp3"),
        };
        let args = strings(&download_args(&job));
        assert!(args.windows(5).any(|w| w == ["-x", "--audio-format", "mp3", "--audio-quality", "0"]));
        assert!(!args.contains(&"-f".to_string()));
    }

    #[test]
    fn mp4_download_merges_and_caps_height() {
        let mut job = DownloadJob {
            url: "https://youtu.be/abc".into(),
            format: DownloadFormat::Mp4,
            max_height: None,
            output: PathBuf::from("/dl/clip.mp4"),
        };
        let args = strings(&download_args(&job));
        assert!(args.windows(2).any(|w| w == ["-f", "bestvideo+bestaudio/best"]));
        assert!(args.windows(2).any(|w| w == ["--merge-output-format", "mp4"]));
        assert!(args.windows(2).any(|w| w == ["-o", "/dl/clip.mp4"]));

        job.max_height = Some(480);
        let args = strings(&download_args(&job));
        assert!(args.contains(&"bestvideo[height<=480]+bestaudio/best[height<=480]".to_string()));
    }

    #[test]
    fn bot_check_is_classified() {
        let stderr = b"ERROR: [youtube] abc: Sign in to confirm you are not a bot. Use --cookies";
        let err = classify_failure(stderr);
        assert_eq!(err, ExtractError::BotDetected);
        assert!(err.to_string().contains("blocking"));
    }

    #[test]
    fn unavailable_and_other_failures_are_classified() {
        assert_eq!(
            classify_failure(b"ERROR: [youtube] x: Video unavailable"),
            ExtractError::Unavailable
        );
        assert_eq!(
            classify_failure(b"WARNING: a\nERROR: network down\n"),
            ExtractError::Failed("ERROR: network down".into())
        );
        assert!(matches!(classify_failure(b""), ExtractError::Failed(_)));
    }

    #[test]
    fn info_is_mapped_with_defaults() {
        let json = br#"{
            "id": "abc",
            "duration": 61.5,
            "view_count": 42,
            "formats": [
                {"format_id": "18", "ext": "mp4", "width": 640, "height": 360,
                 "filesize_approx": 1000, "vcodec": "avc1", "acodec": "mp4a"},
                {"format_id": "140", "ext": "m4a", "resolution": "audio only",
                 "filesize": 500, "vcodec": "none", "acodec": "mp4a"}
            ]
        }"#;
        let info = parse_info(json).unwrap();
        assert_eq!(info.title, "Unknown Video");
        assert_eq!(info.uploader, "Unknown");
        assert_eq!(info.views, Some(42));
        assert_eq!(info.formats[0].resolution.as_deref(), Some("640x360"));
        assert_eq!(info.formats[0].filesize, Some(1000));
        assert!(info.formats[0].has_video);
        assert!(!info.formats[1].has_video);
        assert!(info.formats[1].has_audio);
    }

    #[test]
    fn empty_output_is_a_parse_error() {
        assert!(matches!(parse_info(b"  \n"), Err(ExtractError::Parse(_))));
        assert!(matches!(parse_info(b"<html>"), Err(ExtractError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let err = YtDlpExtractor::new(None)
            .info("https://youtu.be/abc".into())
            .await
            .unwrap_err();
        assert_eq!(err, ExtractError::ToolMissing("yt-dlp".into()));
    }
}
