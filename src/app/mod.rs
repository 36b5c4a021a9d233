// SPDX-License-Identifier: MPL-2.0
//! Host process bootstrap.
//!
//! [`run`] wires the privileged side together: settings and persisted state
//! are loaded, the external tools are located, and the bridge is served over
//! stdin/stdout until the presentation side closes the window or hangs up.
//! Session state is written back on the way out.

pub mod logging;
pub mod paths;
pub mod persisted_state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::watch;

use crate::bridge::{serve, BridgeContext, Collaborators, Dispatcher};
use crate::config::{self, DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY};
use crate::diagnostics::{BufferCapacity, DiagnosticsCollector, DiagnosticsHandle};
use crate::error::{Error, Result};
use crate::infrastructure::{
    FfmpegTranscoder, ImageRsProcessor, RfdFileDialog, TrackedWindow, YtDlpExtractor,
};
use persisted_state::AppState;

/// How often queued diagnostics events are moved into the ring buffer.
const DIAGNOSTICS_DRAIN_INTERVAL: Duration = Duration::from_millis(500);

/// Command-line options for the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Overrides the data directory (persisted state).
    pub data_dir: Option<String>,
    /// Overrides the config directory (`settings.toml`).
    pub config_dir: Option<String>,
    /// Log filter, e.g. `debug` or `zenconvert=trace`.
    pub log_level: Option<String>,
    /// Writes the diagnostics event log here as JSON on exit.
    pub diagnostics_out: Option<PathBuf>,
}

/// Builds the production collaborators for `config`.
fn collaborators(config: &config::Config, window: Arc<TrackedWindow>) -> Collaborators {
    let transcoder = FfmpegTranscoder::discover(config.ffmpeg_path.as_deref());
    let extractor = YtDlpExtractor::discover(config.ytdlp_path.as_deref());
    Collaborators {
        dialog: Arc::new(RfdFileDialog::new()),
        window,
        images: Arc::new(ImageRsProcessor::new()),
        transcoder: Arc::new(transcoder),
        extractor: Arc::new(extractor),
    }
}

/// Keeps the collector draining until `stop` fires, then hands it back.
fn spawn_diagnostics(
    mut collector: DiagnosticsCollector,
    mut stop: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<DiagnosticsCollector> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DIAGNOSTICS_DRAIN_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => collector.process_pending(),
                _ = stop.changed() => break,
            }
        }
        collector.process_pending();
        collector
    })
}

fn record_state_warning(diagnostics: &DiagnosticsHandle, key: &str) {
    log::warn!("Persisted state problem: {key}");
    diagnostics.warning(key);
}

/// Runs the host until the window closes or stdin ends.
///
/// # Errors
///
/// Returns an error when settings cannot be read or the protocol stream
/// fails. Handler failures never end up here.
pub async fn run(flags: Flags) -> Result<()> {
    let config = config::load()?;
    let collector = DiagnosticsCollector::new(BufferCapacity::new(
        DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY,
    ));
    let diagnostics = collector.handle();

    let (state, warning) = AppState::load();
    if let Some(key) = warning {
        record_state_warning(&diagnostics, key);
    }

    let window = Arc::new(TrackedWindow::new(state.window_state));
    let ctx = Arc::new(BridgeContext::new(
        collaborators(&config, Arc::clone(&window)),
        config,
        &state,
    ));
    let dispatcher = Dispatcher::new(Arc::clone(&ctx)).with_diagnostics(diagnostics.clone());

    let (stop_tx, stop_rx) = watch::channel(false);
    let drain = spawn_diagnostics(collector, stop_rx);

    log::info!("ZenConvert host v{} ready", env!("CARGO_PKG_VERSION"));
    let served = serve(
        dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        window.closed(),
    )
    .await;
    log::info!("Bridge stopped");

    if let Some(key) = ctx.persisted_state(window.snapshot()).save() {
        record_state_warning(&diagnostics, key);
    }

    let _ = stop_tx.send(true);
    match drain.await {
        Ok(collector) => {
            let summary = collector.summary();
            log::info!(
                "Session: {} call(s), {} failed, {} signal(s), {} rejected",
                summary.calls,
                summary.failed_calls,
                summary.signals,
                summary.rejected
            );
            if let Some(path) = &flags.diagnostics_out {
                let json = collector.export_json()?;
                tokio::fs::write(path, json).await?;
            }
        }
        Err(err) => log::warn!("Diagnostics task failed: {err}"),
    }

    served.map_err(|err| Error::Protocol(err.to_string()))
}
