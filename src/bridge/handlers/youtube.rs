// SPDX-License-Identifier: MPL-2.0
//! `youtube:get-info` and `youtube:download`.

use std::path::{Path, PathBuf};

use crate::application::port::DownloadJob;
use crate::bridge::context::BridgeContext;
use crate::bridge::envelope::now_millis;
use crate::bridge::error::{BridgeError, ErrorCode};
use crate::bridge::payload::DownloadRequest;
use crate::bridge::response::{DownloadData, VideoInfoData};
use crate::domain::youtube::DownloadFormat;

pub(super) async fn get_info(ctx: &BridgeContext, url: String) -> Result<VideoInfoData, BridgeError> {
    let info = ctx
        .extractor()
        .info(url)
        .await
        .map_err(|e| BridgeError::extraction(ErrorCode::YoutubeInfoError, e))?;
    Ok(VideoInfoData { info })
}

/// `<dir>/zenconvert_<unix ms>.<ext>`.
fn default_download_path(dir: &Path, format: DownloadFormat, millis: i64) -> PathBuf {
    dir.join(format!("zenconvert_{millis}.{}", format.extension()))
}

pub(super) async fn download(
    ctx: &BridgeContext,
    request: DownloadRequest,
) -> Result<DownloadData, BridgeError> {
    let output = request.output_path.unwrap_or_else(|| {
        default_download_path(
            &ctx.config().resolved_download_directory(),
            request.format,
            now_millis(),
        )
    });
    log::info!("Downloading {} as {}", request.url, request.format.extension());
    let written = ctx
        .extractor()
        .download(DownloadJob {
            url: request.url,
            format: request.format,
            max_height: request.max_height,
            output,
        })
        .await
        .map_err(|e| BridgeError::extraction(ErrorCode::YoutubeDownloadError, e))?;
    Ok(DownloadData {
        file_path: written.to_string_lossy().into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_download_name_uses_timestamp_and_extension() {
        let path = default_download_path(Path::new("/dl"), DownloadFormat::Mp3, 1_700_000_000_000);
        assert_eq!(path, PathBuf::from("/dl/zenconvert_1700000000000.mp3"));
    }
}
