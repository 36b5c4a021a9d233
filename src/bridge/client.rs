// SPDX-License-Identifier: MPL-2.0
//! Presentation-side view of the bridge.
//!
//! [`BridgeClient`] knows channel names and payload types and nothing else: it
//! never touches the filesystem and never spawns processes. It reaches the
//! privileged side through a [`Transport`]:
//!
//! - [`InProcessTransport`] calls a [`Dispatcher`] directly
//! - [`LineTransport`] speaks the newline-delimited JSON framing over any
//!   async reader/writer pair, such as a child process's stdio

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::channel::Channel;
use super::dispatch::Dispatcher;
use super::envelope::{Envelope, RawRequest, Request, RequestId};
use super::error::BridgeError;
use super::payload::{
    DialogOpenPayload, FilePathPayload, ImageConvertPayload, ImageOptionsPayload,
    SetToolPayload, UrlPayload, VideoConvertPayload, YoutubeDownloadPayload,
};
use super::response::{
    DialogOpenData, DownloadData, FileMetadata, FileMetadataData, ImageMetadataData,
    OutputPathData, ValidateData, VideoInfoData, WindowStateData,
};
use super::transport::InboundFrame;
use crate::application::port::ImageMetadata;
use crate::domain::file::{FileStatus, WorkingSet};
use crate::domain::navigation::{NavigationState, ToolType};
use crate::domain::window::WindowState;
use crate::domain::youtube::VideoInfo;

/// Carries requests to the privileged side.
pub trait Transport: Send + Sync {
    /// Sends a call and resolves with its envelope.
    ///
    /// Fails only when the bridge itself is unusable (connection closed,
    /// request not encodable); handler failures arrive as failure envelopes.
    fn call<'a>(
        &'a self,
        channel: &'a str,
        request: RawRequest,
    ) -> BoxFuture<'a, Result<Envelope, BridgeError>>;

    /// Sends a signal. No acknowledgement and no delivery guarantee.
    fn signal<'a>(&'a self, channel: &'a str, request: RawRequest) -> BoxFuture<'a, ()>;
}

fn disconnected() -> BridgeError {
    BridgeError::internal("bridge connection closed")
}

// =============================================================================
// In-process
// =============================================================================

/// Transport for an embedded host.
#[derive(Clone)]
pub struct InProcessTransport {
    dispatcher: Dispatcher,
}

impl InProcessTransport {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

impl Transport for InProcessTransport {
    fn call<'a>(
        &'a self,
        channel: &'a str,
        request: RawRequest,
    ) -> BoxFuture<'a, Result<Envelope, BridgeError>> {
        async move { Ok(self.dispatcher.call(channel, request).await) }.boxed()
    }

    fn signal<'a>(&'a self, channel: &'a str, request: RawRequest) -> BoxFuture<'a, ()> {
        self.dispatcher.signal(channel, request);
        futures_util::future::ready(()).boxed()
    }
}

// =============================================================================
// Line-delimited JSON
// =============================================================================

/// Calls waiting for a reply. Once `closed` is set no new waiter is accepted.
#[derive(Default)]
struct Waiters {
    by_id: HashMap<RequestId, oneshot::Sender<Envelope>>,
    closed: bool,
}

type Pending = Arc<Mutex<Waiters>>;

fn lock(pending: &Pending) -> MutexGuard<'_, Waiters> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client end of the host's stdio protocol.
///
/// Replies may arrive in any order; each is routed to its caller by request
/// id. When the host's output ends, every waiting call fails.
pub struct LineTransport {
    outbound: mpsc::Sender<String>,
    pending: Pending,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl LineTransport {
    /// Starts the reader and writer tasks. Must be called inside a tokio
    /// runtime.
    pub fn spawn<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let pending: Pending = Arc::default();
        let (outbound, rx) = mpsc::channel::<String>(64);
        Self {
            reader: tokio::spawn(Self::read_replies(reader, Arc::clone(&pending))),
            writer: tokio::spawn(Self::write_frames(writer, rx)),
            outbound,
            pending,
        }
    }

    async fn read_replies<R>(reader: R, pending: Pending)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("Bridge read failed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let envelope: Envelope = match serde_json::from_str(&line) {
                Ok(envelope) => envelope,
                Err(err) => {
                    log::warn!("Ignoring malformed envelope: {err}");
                    continue;
                }
            };
            match lock(&pending).by_id.remove(envelope.request_id()) {
                Some(waiter) => {
                    let _ = waiter.send(envelope);
                }
                None => log::warn!("Envelope for unknown request {}", envelope.request_id()),
            }
        }
        // Dropping the senders fails every outstanding call.
        let mut waiters = lock(&pending);
        waiters.closed = true;
        waiters.by_id.clear();
    }

    async fn write_frames<W>(mut writer: W, mut rx: mpsc::Receiver<String>)
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = rx.recv().await {
            let written = async {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await
            }
            .await;
            if let Err(err) = written {
                log::warn!("Bridge write failed: {err}");
                break;
            }
        }
    }

    /// Number of calls still waiting for a reply.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.pending).by_id.len()
    }

    fn encode(frame: &InboundFrame) -> Result<String, BridgeError> {
        serde_json::to_string(frame)
            .map_err(|err| BridgeError::internal(format!("failed to encode request: {err}")))
    }
}

impl Drop for LineTransport {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

impl Transport for LineTransport {
    fn call<'a>(
        &'a self,
        channel: &'a str,
        request: RawRequest,
    ) -> BoxFuture<'a, Result<Envelope, BridgeError>> {
        async move {
            let id = request.id.clone();
            let line = Self::encode(&InboundFrame::Invoke {
                channel: channel.to_string(),
                request,
            })?;

            let (tx, rx) = oneshot::channel();
            {
                let mut waiters = lock(&self.pending);
                if waiters.closed {
                    return Err(disconnected());
                }
                if waiters.by_id.insert(id.clone(), tx).is_some() {
                    log::warn!("Request id {id} reused while still in flight");
                }
            }
            if self.outbound.send(line).await.is_err() {
                lock(&self.pending).by_id.remove(&id);
                return Err(disconnected());
            }
            rx.await.map_err(|_| disconnected())
        }
        .boxed()
    }

    fn signal<'a>(&'a self, channel: &'a str, request: RawRequest) -> BoxFuture<'a, ()> {
        async move {
            let frame = InboundFrame::Send {
                channel: channel.to_string(),
                request,
            };
            match Self::encode(&frame) {
                Ok(line) => {
                    if self.outbound.send(line).await.is_err() {
                        log::debug!("Signal {channel} not sent: bridge closed");
                    }
                }
                Err(err) => log::warn!("Signal {channel} not sent: {err}"),
            }
        }
        .boxed()
    }
}

// =============================================================================
// Typed client
// =============================================================================

/// Outcome of a sequential batch conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// `(file id, output path)` for each converted file.
    pub converted: Vec<(String, String)>,
    /// `(file id, error)` for each failed file.
    pub failed: Vec<(String, BridgeError)>,
}

/// Typed calls for every channel.
#[derive(Clone)]
pub struct BridgeClient {
    transport: Arc<dyn Transport>,
}

impl BridgeClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn in_process(dispatcher: Dispatcher) -> Self {
        Self::new(Arc::new(InProcessTransport::new(dispatcher)))
    }

    /// Calls `channel` and decodes the success data.
    ///
    /// # Errors
    ///
    /// Returns the envelope's error, a transport failure, or an
    /// `INTERNAL_ERROR` when the reply is correlated to another request.
    pub async fn invoke<P, T>(&self, channel: Channel, payload: P) -> Result<T, BridgeError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = Request::new(payload)
            .into_raw()
            .map_err(|err| BridgeError::internal(format!("failed to encode payload: {err}")))?;
        let id = request.id.clone();
        let envelope = self.transport.call(channel.name(), request).await?;
        if envelope.request_id() != &id {
            return Err(BridgeError::internal(format!(
                "reply for {} does not match request {id}",
                envelope.request_id()
            )));
        }
        envelope.decode()
    }

    async fn send<P: Serialize>(&self, channel: Channel, payload: P) {
        match Request::new(payload).into_raw() {
            Ok(request) => self.transport.signal(channel.name(), request).await,
            Err(err) => log::warn!("Signal {channel} not sent: {err}"),
        }
    }

    pub async fn open_dialog(&self, payload: DialogOpenPayload) -> Result<DialogOpenData, BridgeError> {
        self.invoke(Channel::DialogOpen, payload).await
    }

    pub async fn window_state(&self) -> Result<WindowState, BridgeError> {
        let data: WindowStateData = self.invoke(Channel::WindowGetState, json!({})).await?;
        Ok(data.state)
    }

    pub async fn minimize_window(&self) {
        self.send(Channel::WindowMinimize, json!({})).await;
    }

    /// Toggles between maximized and normal.
    pub async fn maximize_window(&self) {
        self.send(Channel::WindowMaximize, json!({})).await;
    }

    pub async fn unmaximize_window(&self) {
        self.send(Channel::WindowUnmaximize, json!({})).await;
    }

    pub async fn close_window(&self) {
        self.send(Channel::WindowClose, json!({})).await;
    }

    pub async fn validate_file(&self, file_path: &str) -> Result<ValidateData, BridgeError> {
        self.invoke(Channel::FilesValidate, path_payload(file_path)).await
    }

    pub async fn file_metadata(&self, file_path: &str) -> Result<FileMetadata, BridgeError> {
        let data: FileMetadataData = self
            .invoke(Channel::FilesGetMetadata, path_payload(file_path))
            .await?;
        Ok(data.metadata)
    }

    pub async fn current_tool(&self) -> Result<NavigationState, BridgeError> {
        self.invoke(Channel::NavigationGetTool, json!({})).await
    }

    pub async fn set_tool(&self, tool: ToolType) {
        self.send(Channel::NavigationSetTool, SetToolPayload { tool }).await;
    }

    pub async fn image_metadata(&self, file_path: &str) -> Result<ImageMetadata, BridgeError> {
        let data: ImageMetadataData = self
            .invoke(Channel::ImageGetMetadata, path_payload(file_path))
            .await?;
        Ok(data.metadata)
    }

    /// Converts one image and returns the written path.
    pub async fn convert_image(
        &self,
        file_path: &str,
        options: ImageOptionsPayload,
    ) -> Result<String, BridgeError> {
        let payload = ImageConvertPayload {
            file_path: file_path.to_string(),
            options,
        };
        let data: OutputPathData = self.invoke(Channel::ImageConvert, payload).await?;
        Ok(data.output_path)
    }

    pub async fn convert_video(&self, payload: VideoConvertPayload) -> Result<String, BridgeError> {
        let data: OutputPathData = self.invoke(Channel::VideoConvert, payload).await?;
        Ok(data.output_path)
    }

    pub async fn video_info(&self, url: &str) -> Result<VideoInfo, BridgeError> {
        let payload = UrlPayload {
            url: url.to_string(),
        };
        let data: VideoInfoData = self.invoke(Channel::YoutubeGetInfo, payload).await?;
        Ok(data.info)
    }

    pub async fn download(&self, payload: YoutubeDownloadPayload) -> Result<String, BridgeError> {
        let data: DownloadData = self.invoke(Channel::YoutubeDownload, payload).await?;
        Ok(data.file_path)
    }

    /// Converts every pending file in `set`, one at a time.
    ///
    /// Each file moves to `Processing`, then to `Completed` or `Failed`. A
    /// failure affects only that file; the batch carries on.
    pub async fn convert_images_sequentially(
        &self,
        set: &mut WorkingSet,
        options: &ImageOptionsPayload,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for id in set.pending_ids() {
            let Some(path) = set.get(&id).map(|f| f.path.clone()) else {
                continue;
            };
            if let Err(err) = set.set_status(&id, FileStatus::Processing) {
                log::warn!("Skipping {id}: {err}");
                continue;
            }
            let outcome = self.convert_image(&path, options.clone()).await;
            let next = if outcome.is_ok() {
                FileStatus::Completed
            } else {
                FileStatus::Failed
            };
            if let Err(err) = set.set_status(&id, next) {
                log::warn!("Could not record outcome for {id}: {err}");
            }
            match outcome {
                Ok(output) => report.converted.push((id, output)),
                Err(err) => report.failed.push((id, err)),
            }
        }
        report
    }
}

fn path_payload(file_path: &str) -> FilePathPayload {
    FilePathPayload {
        file_path: file_path.to_string(),
    }
}

/// Raw escape hatch for channels addressed by name, mainly for probing how the
/// host treats names it does not know.
///
/// # Errors
///
/// Returns a transport failure; handler failures come back in the envelope.
pub async fn call_raw(
    transport: &dyn Transport,
    channel: &str,
    payload: Value,
) -> Result<Envelope, BridgeError> {
    transport.call(channel, Request::new(payload)).await
}
