// SPDX-License-Identifier: MPL-2.0
//! `files:validate` and `files:get-metadata`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::application::port::MediaProbe;
use crate::bridge::context::BridgeContext;
use crate::bridge::error::{BridgeError, ErrorCode};
use crate::bridge::response::{
    BasicMetadata, FileMetadata, FileMetadataData, ValidateData, ValidationIssue,
};
use crate::domain::file::SelectedFile;

fn millis(time: io::Result<SystemTime>) -> i64 {
    time.map(|t| DateTime::<Utc>::from(t).timestamp_millis())
        .unwrap_or(0)
}

/// Stats `path` and builds a pending [`SelectedFile`] for it.
///
/// # Errors
///
/// Fails if the path cannot be stat'ed or is not a regular file.
pub(crate) async fn describe(path: &Path) -> io::Result<SelectedFile> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    Ok(SelectedFile::from_path(path, meta.len(), millis(meta.modified())))
}

/// Whether writing to `output` would replace `input`.
///
/// Text equality is checked first; otherwise both paths are resolved, which
/// follows `..` segments and symlinks. A path that does not resolve cannot
/// name an existing input.
pub(crate) async fn same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (
        tokio::fs::canonicalize(input).await,
        tokio::fs::canonicalize(output).await,
    ) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

fn issue(code: &str, message: impl Into<String>) -> ValidateData {
    ValidateData {
        valid: false,
        file: None,
        error: Some(ValidationIssue {
            code: code.to_string(),
            message: message.into(),
        }),
    }
}

/// Checks that `path` is an existing, readable regular file. Never mutates
/// anything, so repeated calls agree.
pub(super) async fn validate(path: PathBuf) -> ValidateData {
    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return issue("NOT_FOUND", "File does not exist");
        }
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            return issue("ACCESS_DENIED", "File cannot be accessed");
        }
        Err(err) => return issue("UNREADABLE", err.to_string()),
    };
    if !meta.is_file() {
        return issue("NOT_A_FILE", "Path is not a regular file");
    }
    if let Err(err) = tokio::fs::File::open(&path).await {
        return issue("ACCESS_DENIED", format!("File cannot be opened: {err}"));
    }
    ValidateData {
        valid: true,
        file: Some(SelectedFile::from_path(
            &path,
            meta.len(),
            millis(meta.modified()),
        )),
        error: None,
    }
}

async fn probe_media(ctx: &BridgeContext, path: &Path, mime_type: &str) -> Option<MediaProbe> {
    let probed = if mime_type.starts_with("image/") {
        ctx.images()
            .metadata(path.to_path_buf())
            .await
            .map(|m| MediaProbe {
                width: m.width,
                height: m.height,
                format: m.format,
                ..MediaProbe::default()
            })
            .map_err(|e| e.to_string())
    } else if mime_type.starts_with("video/") || mime_type.starts_with("audio/") {
        ctx.transcoder()
            .probe(path.to_path_buf())
            .await
            .map_err(|e| e.to_string())
    } else {
        return None;
    };
    match probed {
        Ok(media) => Some(media),
        Err(err) => {
            log::debug!("Media probe skipped: {err}");
            None
        }
    }
}

/// Basic filesystem facts plus, when a prober recognizes the file, media facts.
/// Probe failures only drop the `media` section.
pub(super) async fn get_metadata(
    ctx: &BridgeContext,
    path: PathBuf,
) -> Result<FileMetadataData, BridgeError> {
    let meta = tokio::fs::metadata(&path).await.map_err(|err| {
        BridgeError::new(ErrorCode::FileError, format!("Cannot read {}: {err}", path.display()))
    })?;
    if !meta.is_file() {
        return Err(BridgeError::new(
            ErrorCode::FileError,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let file = SelectedFile::from_path(&path, meta.len(), millis(meta.modified()));
    let media = probe_media(ctx, &path, &file.mime_type).await;
    Ok(FileMetadataData {
        metadata: FileMetadata {
            basic: BasicMetadata {
                name: file.name,
                size: file.size,
                extension: file.extension,
                mime_type: file.mime_type,
                last_modified: file.last_modified,
                created: millis(meta.created()),
            },
            media,
        },
    })
}
