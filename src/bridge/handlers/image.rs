// SPDX-License-Identifier: MPL-2.0
//! `image:get-metadata` and `image:convert`.

use std::path::PathBuf;

use super::files::same_file;
use crate::application::port::ImageJob;
use crate::bridge::context::BridgeContext;
use crate::bridge::error::BridgeError;
use crate::bridge::response::{ImageMetadataData, OutputPathData};
use crate::domain::conversion::{image_output_path, ImageConvertOptions, ImageQuality};

pub(super) async fn get_metadata(
    ctx: &BridgeContext,
    path: PathBuf,
) -> Result<ImageMetadataData, BridgeError> {
    let metadata = ctx
        .images()
        .metadata(path)
        .await
        .map_err(BridgeError::metadata)?;
    Ok(ImageMetadataData { metadata })
}

/// Quality from settings, used when a request leaves it out.
fn configured_quality(ctx: &BridgeContext) -> ImageQuality {
    match ctx.config().default_image_quality {
        Some(q) => ImageQuality::new(u32::from(q)).unwrap_or_else(|| {
            log::warn!("Ignoring out-of-range default_image_quality {q}");
            ImageQuality::default()
        }),
        None => ImageQuality::default(),
    }
}

pub(super) async fn convert(
    ctx: &BridgeContext,
    input: PathBuf,
    mut options: ImageConvertOptions,
) -> Result<OutputPathData, BridgeError> {
    let output = image_output_path(&input, options.format, options.output_path.as_deref());
    if same_file(&input, &output).await {
        return Err(BridgeError::validation(
            "output path would overwrite the input file",
        ));
    }
    if options.quality.is_none() {
        options.quality = Some(configured_quality(ctx));
    } else if !options.format.is_lossy() {
        log::debug!("Quality has no effect on {} output", options.format);
    }

    log::info!("Converting image to {}", options.format);
    let written = ctx
        .images()
        .convert(ImageJob {
            input,
            output,
            options,
        })
        .await?;
    Ok(OutputPathData {
        output_path: written.to_string_lossy().into_owned(),
    })
}
