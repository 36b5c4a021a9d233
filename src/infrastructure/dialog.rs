// SPDX-License-Identifier: MPL-2.0
//! Native open dialog backed by `rfd`.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::path::PathBuf;

use crate::application::port::{DialogError, DialogRequest, FileDialog};

#[derive(Debug, Clone, Copy, Default)]
pub struct RfdFileDialog;

impl RfdFileDialog {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// On Linux a picker needs a display server or a desktop portal session.
fn display_available() -> bool {
    if !cfg!(target_os = "linux") {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY", "DBUS_SESSION_BUS_ADDRESS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

impl FileDialog for RfdFileDialog {
    fn pick_files(
        &self,
        request: DialogRequest,
    ) -> BoxFuture<'_, Result<Option<Vec<PathBuf>>, DialogError>> {
        async move {
            if !display_available() {
                return Err(DialogError::Unavailable(
                    "no display server or desktop portal".into(),
                ));
            }

            let mut dialog = rfd::AsyncFileDialog::new().set_title(&request.title);
            for filter in &request.filters {
                let extensions: Vec<&str> = filter
                    .extensions
                    .iter()
                    .map(|ext| ext.trim_start_matches('.'))
                    .collect();
                dialog = dialog.add_filter(&filter.name, &extensions);
            }
            if let Some(dir) = request.directory.as_ref().filter(|d| d.is_dir()) {
                dialog = dialog.set_directory(dir);
            }

            let picked = if request.multiple {
                dialog.pick_files().await
            } else {
                dialog.pick_file().await.map(|handle| vec![handle])
            };
            Ok(picked.map(|handles| {
                handles
                    .into_iter()
                    .map(|h| h.path().to_path_buf())
                    .collect()
            }))
        }
        .boxed()
    }
}
