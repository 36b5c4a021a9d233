// SPDX-License-Identifier: MPL-2.0
//! Native file picker port.

use futures_util::future::BoxFuture;
use std::fmt;
use std::path::PathBuf;

use crate::domain::file::FileFilter;

/// Errors raised by the dialog backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// No windowing system or portal is available.
    Unavailable(String),
    /// The backend reported a failure while the dialog was open.
    Failed(String),
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogError::Unavailable(msg) => write!(f, "File dialog unavailable: {msg}"),
            DialogError::Failed(msg) => write!(f, "File dialog failed: {msg}"),
        }
    }
}

impl std::error::Error for DialogError {}

/// What to show in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub title: String,
    pub multiple: bool,
    pub filters: Vec<FileFilter>,
    /// Directory the picker opens in.
    pub directory: Option<PathBuf>,
}

/// Port for the native open-file dialog.
pub trait FileDialog: Send + Sync {
    /// Shows the picker and resolves once the user confirms or dismisses it.
    ///
    /// Returns `Ok(None)` when the user cancels; cancellation is not an error.
    fn pick_files(
        &self,
        request: DialogRequest,
    ) -> BoxFuture<'_, Result<Option<Vec<PathBuf>>, DialogError>>;
}
