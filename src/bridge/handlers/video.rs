// SPDX-License-Identifier: MPL-2.0
//! `video:convert`.

use super::files::same_file;
use crate::application::port::TranscodeJob;
use crate::bridge::context::BridgeContext;
use crate::bridge::error::BridgeError;
use crate::bridge::payload::VideoConvertRequest;
use crate::bridge::response::OutputPathData;
use crate::domain::conversion::{video_output_path, with_converted_suffix};

pub(super) async fn convert(
    ctx: &BridgeContext,
    request: VideoConvertRequest,
) -> Result<OutputPathData, BridgeError> {
    let mut output = video_output_path(
        &request.input,
        request.options.format,
        request.output_directory.as_deref(),
    );
    if same_file(&request.input, &output).await {
        output = with_converted_suffix(&output);
    }
    log::info!(
        "Transcoding video to {} ({:?})",
        request.options.format.extension(),
        request.options.quality
    );
    let written = ctx
        .transcoder()
        .transcode(TranscodeJob {
            input: request.input,
            output,
            options: request.options,
            subtitle: request.subtitle,
        })
        .await?;
    Ok(OutputPathData {
        output_path: written.to_string_lossy().into_owned(),
    })
}
