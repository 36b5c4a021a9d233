// SPDX-License-Identifier: MPL-2.0
//! `dialog:open`.

use std::path::{Path, PathBuf};

use super::files::describe;
use crate::application::port::DialogRequest;
use crate::bridge::context::BridgeContext;
use crate::bridge::error::BridgeError;
use crate::bridge::payload::DialogOpenPayload;
use crate::bridge::response::DialogOpenData;

pub(super) async fn open(
    ctx: &BridgeContext,
    payload: DialogOpenPayload,
) -> Result<DialogOpenData, BridgeError> {
    let directory = payload
        .default_path
        .map(PathBuf::from)
        .or_else(|| ctx.last_used_directory());
    let filters = payload.filters;

    let picked = ctx
        .dialog()
        .pick_files(DialogRequest {
            title: payload.title,
            multiple: payload.multiple,
            filters: filters.clone(),
            directory,
        })
        .await?;

    let paths = match picked {
        Some(paths) if !paths.is_empty() => paths,
        _ => {
            log::debug!("Open dialog canceled");
            return Ok(DialogOpenData {
                files: Vec::new(),
                canceled: true,
            });
        }
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        if !filters.is_empty() && !filters.iter().any(|f| f.matches(path)) {
            log::warn!("Dropping picked file outside the dialog filters");
            continue;
        }
        match describe(path).await {
            Ok(file) => files.push(file),
            Err(err) => log::warn!("Skipping unreadable pick {}: {err}", path.display()),
        }
    }
    // Only a file the user actually gets back moves the remembered directory.
    if let Some(first) = files.first() {
        ctx.remember_directory_of(Path::new(&first.path));
    }
    if !payload.multiple {
        files.truncate(1);
    }

    log::info!("Dialog returned {} file(s)", files.len());
    Ok(DialogOpenData {
        files,
        canceled: false,
    })
}
