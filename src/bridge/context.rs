// SPDX-License-Identifier: MPL-2.0
//! Everything handlers may touch, owned by the host bootstrap.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::persisted_state::AppState;
use crate::application::port::{
    FileDialog, ImageProcessor, VideoExtractor, VideoTranscoder, WindowController,
};
use crate::config::Config;
use crate::domain::navigation::{NavigationState, ToolType};
use crate::domain::window::WindowState;

/// The external collaborators, behind their ports.
#[derive(Clone)]
pub struct Collaborators {
    pub dialog: Arc<dyn FileDialog>,
    pub window: Arc<dyn WindowController>,
    pub images: Arc<dyn ImageProcessor>,
    pub transcoder: Arc<dyn VideoTranscoder>,
    pub extractor: Arc<dyn VideoExtractor>,
}

/// Shared state for all handlers.
///
/// The session state is small and never held across an `.await`, so a plain
/// mutex is enough. Its `window_state` field is not kept current here; the
/// window controller is the source of truth for bounds.
pub struct BridgeContext {
    collaborators: Collaborators,
    config: Config,
    session: Mutex<AppState>,
}

impl BridgeContext {
    #[must_use]
    pub fn new(collaborators: Collaborators, config: Config, restored: &AppState) -> Self {
        Self {
            collaborators,
            config,
            session: Mutex::new(restored.clone()),
        }
    }

    fn session(&self) -> MutexGuard<'_, AppState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dialog(&self) -> &dyn FileDialog {
        self.collaborators.dialog.as_ref()
    }

    pub fn window(&self) -> &dyn WindowController {
        self.collaborators.window.as_ref()
    }

    pub fn images(&self) -> &dyn ImageProcessor {
        self.collaborators.images.as_ref()
    }

    pub fn transcoder(&self) -> &dyn VideoTranscoder {
        self.collaborators.transcoder.as_ref()
    }

    pub fn extractor(&self) -> &dyn VideoExtractor {
        self.collaborators.extractor.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationState {
        self.session().navigation_state
    }

    pub fn select_tool(&self, tool: ToolType, timestamp: i64) {
        self.session().navigation_state.select(tool, timestamp);
    }

    #[must_use]
    pub fn last_used_directory(&self) -> Option<PathBuf> {
        self.session().last_used_directory.clone()
    }

    /// Remembers the directory containing `file` for the next dialog.
    pub fn remember_directory_of(&self, file: &Path) {
        self.session().remember_directory_of(file);
    }

    /// State to persist, with the window's final bounds.
    #[must_use]
    pub fn persisted_state(&self, window_state: WindowState) -> AppState {
        AppState {
            window_state,
            ..self.session().clone()
        }
    }
}
