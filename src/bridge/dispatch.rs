// SPDX-License-Identifier: MPL-2.0
//! Host-side routing from channel names to handlers.
//!
//! Every call yields exactly one [`Envelope`] echoing the request id, whatever
//! happens in between: unknown channels, bad payloads, handler errors and
//! handler panics all become failure envelopes.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;

use super::channel::{Channel, ChannelKind};
use super::context::BridgeContext;
use super::envelope::{Envelope, RawRequest};
use super::error::{BridgeError, ErrorCode};
use super::handlers;
use super::payload::{CallRequest, SignalRequest};
use crate::diagnostics::{sanitize_message, DiagnosticsHandle, RejectReason};

/// Routes inbound messages. Cheap to clone; clones share one context.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<BridgeContext>,
    diagnostics: Option<DiagnosticsHandle>,
}

/// Truncated, sanitized channel name for logs.
fn printable(channel: &str) -> String {
    sanitize_message(channel).chars().take(64).collect()
}

impl Dispatcher {
    #[must_use]
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self {
            ctx,
            diagnostics: None,
        }
    }

    /// Records dispatch events into a diagnostics collector.
    #[must_use]
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    #[must_use]
    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.ctx
    }

    fn reject(&self, channel: &str, reason: RejectReason) {
        if let Some(diag) = &self.diagnostics {
            diag.rejected(channel, reason);
        }
    }

    /// Resolves `name` to a channel of the expected kind.
    fn resolve(&self, name: &str, expected: ChannelKind) -> Result<Channel, BridgeError> {
        let Ok(channel) = name.parse::<Channel>() else {
            log::warn!("Rejected message on unknown channel '{}'", printable(name));
            self.reject(name, RejectReason::UnknownChannel);
            return Err(BridgeError::new(
                ErrorCode::UnknownChannel,
                format!("unknown channel '{}'", printable(name)),
            ));
        };
        if channel.kind() != expected {
            self.reject(name, RejectReason::WrongKind);
        }
        Ok(channel)
    }

    /// Handles an invoke-style request and returns its envelope.
    pub async fn call(&self, channel: &str, request: RawRequest) -> Envelope {
        let RawRequest { id, payload, .. } = request;
        let started = Instant::now();

        let outcome = match self.resolve(channel, ChannelKind::Call) {
            Ok(resolved) => self.run_call(resolved, id.as_str(), payload).await,
            Err(err) => Err(err),
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if let Some(diag) = &self.diagnostics {
            diag.call_completed(
                &printable(channel),
                id.as_str(),
                elapsed_ms,
                outcome.as_ref().err().map(|e| e.code),
            );
        }

        match outcome {
            Ok(data) => {
                log::debug!("{} [{id}] ok in {elapsed_ms}ms", printable(channel));
                Envelope::success(id, data)
            }
            Err(err) => {
                log::warn!("{} [{id}] failed in {elapsed_ms}ms: {err}", printable(channel));
                Envelope::failure(id, err)
            }
        }
    }

    async fn run_call(
        &self,
        channel: Channel,
        request_id: &str,
        payload: Value,
    ) -> Result<Value, BridgeError> {
        let request = CallRequest::decode(channel, payload).inspect_err(|_| {
            if channel.is_call() {
                self.reject(channel.name(), RejectReason::InvalidPayload);
            }
        })?;

        if let Some(diag) = &self.diagnostics {
            diag.call_dispatched(channel.name(), request_id);
        }

        let ctx = Arc::clone(&self.ctx);
        match AssertUnwindSafe(async move { handlers::call(&ctx, request).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                log::error!("Handler for {channel} panicked");
                Err(BridgeError::internal(format!("handler for {channel} panicked")))
            }
        }
    }

    /// Handles a fire-and-forget signal. Failures are logged, never returned
    /// to the sender.
    pub fn signal(&self, channel: &str, request: RawRequest) {
        if let Err(err) = self.try_signal(channel, request) {
            log::warn!("Signal {} dropped: {err}", printable(channel));
        }
    }

    /// Like [`Dispatcher::signal`], but reports the outcome. Used by in-process
    /// callers and tests.
    ///
    /// # Errors
    ///
    /// Returns the validation or handler error for the signal.
    pub fn try_signal(&self, channel: &str, request: RawRequest) -> Result<(), BridgeError> {
        let resolved = self.resolve(channel, ChannelKind::Signal)?;
        let signal = SignalRequest::decode(resolved, request.payload).inspect_err(|_| {
            if !resolved.is_call() {
                self.reject(resolved.name(), RejectReason::InvalidPayload);
            }
        })?;

        let ctx = &self.ctx;
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| handlers::signal(ctx, signal)))
            .unwrap_or_else(|_| {
                log::error!("Signal handler for {resolved} panicked");
                Err(BridgeError::internal(format!("handler for {resolved} panicked")))
            });
        if outcome.is_ok() {
            if let Some(diag) = &self.diagnostics {
                diag.signal_delivered(resolved.name());
            }
            log::debug!("{resolved} delivered");
        }
        outcome
    }
}
