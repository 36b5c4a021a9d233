// SPDX-License-Identifier: MPL-2.0
//! `image` crate adapter implementing the [`ImageProcessor`] port trait.
//!
//! Decoding and encoding are CPU-bound, so both run on tokio's blocking pool.
//! Quality is honoured by the JPEG and AVIF encoders; the WebP encoder is
//! lossless and ignores it.
//!
//! [`ImageProcessor`]: crate::application::port::ImageProcessor

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use image_rs::codecs::avif::AvifEncoder;
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::imageops::FilterType;
use image_rs::{DynamicImage, GenericImageView, ImageReader};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::application::port::{ImageError, ImageJob, ImageMetadata, ImageProcessor};
use crate::config::AVIF_ENCODER_SPEED;
use crate::domain::conversion::ImageFormat;

/// Largest edge the ICO container accepts.
const ICO_MAX_EDGE: u32 = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsProcessor;

impl ImageRsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ImageProcessor for ImageRsProcessor {
    fn metadata(&self, path: PathBuf) -> BoxFuture<'_, Result<ImageMetadata, ImageError>> {
        async move {
            tokio::task::spawn_blocking(move || read_metadata(&path))
                .await
                .map_err(|e| ImageError::Io(format!("metadata worker failed: {e}")))?
        }
        .boxed()
    }

    fn convert(&self, job: ImageJob) -> BoxFuture<'_, Result<PathBuf, ImageError>> {
        async move {
            tokio::task::spawn_blocking(move || convert_blocking(job))
                .await
                .map_err(|e| ImageError::Io(format!("conversion worker failed: {e}")))?
        }
        .boxed()
    }
}

fn ensure_exists(path: &Path) -> Result<u64, ImageError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ImageError::NotFound(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Reads size from the filesystem and dimensions/format from the header only.
fn read_metadata(path: &Path) -> Result<ImageMetadata, ImageError> {
    let size = ensure_exists(path)?;
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .and_then(|f| f.extensions_str().first().copied())
        .map(str::to_string);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    Ok(ImageMetadata {
        width: Some(width),
        height: Some(height),
        format,
        size,
    })
}

/// Applies an optional resize. A single side keeps the aspect ratio.
fn resize(img: DynamicImage, width: Option<u32>, height: Option<u32>) -> DynamicImage {
    match (width, height) {
        (Some(w), Some(h)) => img.resize_exact(w, h, FilterType::Lanczos3),
        (Some(w), None) => img.resize(w, u32::MAX, FilterType::Lanczos3),
        (None, Some(h)) => img.resize(u32::MAX, h, FilterType::Lanczos3),
        (None, None) => img,
    }
}

fn convert_blocking(job: ImageJob) -> Result<PathBuf, ImageError> {
    ensure_exists(&job.input)?;
    let decoded = ImageReader::open(&job.input)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    let mut img = resize(decoded, job.options.width, job.options.height);
    if job.options.format == ImageFormat::Ico {
        let (w, h) = img.dimensions();
        if w > ICO_MAX_EDGE || h > ICO_MAX_EDGE {
            img = img.resize(ICO_MAX_EDGE, ICO_MAX_EDGE, FilterType::Lanczos3);
        }
    }

    let result = encode(&img, &job);
    if result.is_err() {
        // Leave no truncated file behind.
        let _ = fs::remove_file(&job.output);
    }
    result.map(|()| job.output)
}

fn encode(img: &DynamicImage, job: &ImageJob) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(&job.output)?);
    let quality = job.options.quality.unwrap_or_default().value();
    let encoded = match job.options.format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality)),
        ImageFormat::Avif => img.write_with_encoder(AvifEncoder::new_with_speed_quality(
            &mut writer,
            AVIF_ENCODER_SPEED,
            quality,
        )),
        ImageFormat::Png => img.write_to(&mut writer, image_rs::ImageFormat::Png),
        ImageFormat::Webp => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut writer, image_rs::ImageFormat::WebP)
        }
        ImageFormat::Bmp => img.write_to(&mut writer, image_rs::ImageFormat::Bmp),
        ImageFormat::Tiff => img.write_to(&mut writer, image_rs::ImageFormat::Tiff),
        ImageFormat::Ico => img.write_to(&mut writer, image_rs::ImageFormat::Ico),
    };
    encoded.map_err(|e| ImageError::Encode(format!("{}: {e}", job.options.format)))?;
    writer.flush()?;
    Ok(())
}
