// SPDX-License-Identifier: MPL-2.0
//! Window lifecycle port.

use std::fmt;

use crate::domain::window::WindowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The window has already been closed.
    Closed,
    /// The platform refused the operation.
    Failed(String),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::Closed => write!(f, "Window is closed"),
            WindowError::Failed(msg) => write!(f, "Window operation failed: {msg}"),
        }
    }
}

impl std::error::Error for WindowError {}

/// Port for the single application window.
///
/// All operations are cheap and synchronous. They are invoked from handlers
/// running on the async runtime and must not block.
pub trait WindowController: Send + Sync {
    /// Current bounds and flags.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Closed`] once the window is gone.
    fn state(&self) -> Result<WindowState, WindowError>;

    /// # Errors
    ///
    /// Returns an error if the window is closed or the platform refuses.
    fn minimize(&self) -> Result<(), WindowError>;

    /// # Errors
    ///
    /// Returns an error if the window is closed or the platform refuses.
    fn maximize(&self) -> Result<(), WindowError>;

    /// # Errors
    ///
    /// Returns an error if the window is closed or the platform refuses.
    fn unmaximize(&self) -> Result<(), WindowError>;

    /// Closes the window, which ends the privileged process.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is already closed.
    fn close(&self) -> Result<(), WindowError>;
}
