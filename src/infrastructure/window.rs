// SPDX-License-Identifier: MPL-2.0
//! Window controller for the host process.
//!
//! The presentation process draws the window; the host owns its lifecycle
//! state. Closing resolves [`TrackedWindow::closed`], which the host uses to
//! shut down.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::application::port::{WindowController, WindowError};
use crate::config::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};
use crate::domain::window::WindowState;

#[derive(Debug)]
struct Inner {
    state: WindowState,
    minimized: bool,
}

#[derive(Debug)]
pub struct TrackedWindow {
    inner: Mutex<Inner>,
    closed_tx: watch::Sender<bool>,
}

impl TrackedWindow {
    /// Starts from a restored state, enforcing the minimum size.
    #[must_use]
    pub fn new(initial: WindowState) -> Self {
        let state = WindowState {
            width: initial.width.max(MIN_WINDOW_WIDTH),
            height: initial.height.max(MIN_WINDOW_HEIGHT),
            ..initial
        };
        let (closed_tx, _) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                state,
                minimized: false,
            }),
            closed_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded data is plain values; a panicked holder cannot leave it torn.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<MutexGuard<'_, Inner>, WindowError> {
        if self.is_closed() {
            return Err(WindowError::Closed);
        }
        Ok(self.lock())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    #[must_use]
    pub fn is_minimized(&self) -> bool {
        self.lock().minimized
    }

    /// Receiver that flips to `true` once the window closes.
    #[must_use]
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }

    /// Last known state, readable after close for persistence.
    #[must_use]
    pub fn snapshot(&self) -> WindowState {
        self.lock().state
    }
}

impl Default for TrackedWindow {
    fn default() -> Self {
        Self::new(WindowState::default())
    }
}

impl WindowController for TrackedWindow {
    fn state(&self) -> Result<WindowState, WindowError> {
        Ok(self.open()?.state)
    }

    fn minimize(&self) -> Result<(), WindowError> {
        self.open()?.minimized = true;
        Ok(())
    }

    fn maximize(&self) -> Result<(), WindowError> {
        let mut inner = self.open()?;
        inner.minimized = false;
        inner.state.is_maximized = true;
        Ok(())
    }

    fn unmaximize(&self) -> Result<(), WindowError> {
        let mut inner = self.open()?;
        inner.minimized = false;
        inner.state.is_maximized = false;
        Ok(())
    }

    fn close(&self) -> Result<(), WindowError> {
        if self.closed_tx.send_replace(true) {
            return Err(WindowError::Closed);
        }
        log::info!("Window closed");
        Ok(())
    }
}
