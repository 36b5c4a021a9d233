// SPDX-License-Identifier: MPL-2.0
//! Central collector for bridge events.
//!
//! The dispatcher holds a cheap [`DiagnosticsHandle`] and pushes events over a
//! bounded channel; the host drains them into a [`CircularBuffer`] and can
//! export the buffer as JSON.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;

use super::{
    sanitize_message, BridgeEvent, BridgeEventKind, BufferCapacity, CircularBuffer, RejectReason,
};
use crate::bridge::ErrorCode;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Sending side of the collector. Never blocks: events are dropped when the
/// channel is full.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<BridgeEvent>,
}

impl DiagnosticsHandle {
    fn emit(&self, kind: BridgeEventKind) {
        let _ = self.event_tx.try_send(BridgeEvent::new(kind));
    }

    pub fn call_dispatched(&self, channel: &str, request_id: &str) {
        self.emit(BridgeEventKind::CallDispatched {
            channel: channel.to_string(),
            request_id: request_id.to_string(),
        });
    }

    pub fn call_completed(
        &self,
        channel: &str,
        request_id: &str,
        duration_ms: u64,
        error_code: Option<ErrorCode>,
    ) {
        self.emit(BridgeEventKind::CallCompleted {
            channel: channel.to_string(),
            request_id: request_id.to_string(),
            duration_ms,
            error_code,
        });
    }

    pub fn signal_delivered(&self, channel: &str) {
        self.emit(BridgeEventKind::SignalDelivered {
            channel: channel.to_string(),
        });
    }

    /// Records a rejected message. The channel name comes from the less
    /// trusted side, so it is sanitized and truncated.
    pub fn rejected(&self, channel: &str, reason: RejectReason) {
        let channel: String = sanitize_message(channel).chars().take(64).collect();
        self.emit(BridgeEventKind::Rejected { channel, reason });
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(BridgeEventKind::Warning {
            message: sanitize_message(&message.into()),
        });
    }
}

/// Counts over the buffered events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub calls: usize,
    pub failed_calls: usize,
    pub signals: usize,
    pub rejected: usize,
    pub warnings: usize,
}

pub struct DiagnosticsCollector {
    buffer: CircularBuffer<BridgeEvent>,
    event_rx: Receiver<BridgeEvent>,
    event_tx: Sender<BridgeEvent>,
}

impl DiagnosticsCollector {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (event_tx, event_rx) = bounded(DEFAULT_CHANNEL_CAPACITY);
        Self {
            buffer: CircularBuffer::new(capacity),
            event_rx,
            event_tx,
        }
    }

    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// Moves every queued event into the buffer.
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &BridgeEvent> {
        self.buffer.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[must_use]
    pub fn summary(&self) -> EventSummary {
        let mut summary = EventSummary::default();
        for event in self.buffer.iter() {
            match &event.kind {
                BridgeEventKind::CallCompleted { error_code, .. } => {
                    summary.calls += 1;
                    if error_code.is_some() {
                        summary.failed_calls += 1;
                    }
                }
                BridgeEventKind::SignalDelivered { .. } => summary.signals += 1,
                BridgeEventKind::Rejected { .. } => summary.rejected += 1,
                BridgeEventKind::Warning { .. } => summary.warnings += 1,
                BridgeEventKind::CallDispatched { .. } => {}
            }
        }
        summary
    }

    /// Buffered events as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let events: Vec<&BridgeEvent> = self.buffer.iter().collect();
        serde_json::to_string_pretty(&events)
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(BufferCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_events_reach_buffer_after_processing() {
        let mut collector = DiagnosticsCollector::default();
        let handle = collector.handle();
        handle.call_dispatched("image:convert", "a");
        handle.call_completed("image:convert", "a", 5, None);
        assert!(collector.is_empty());

        collector.process_pending();
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn summary_counts_by_kind() {
        let mut collector = DiagnosticsCollector::default();
        let handle = collector.handle();
        handle.call_completed("image:convert", "a", 5, None);
        handle.call_completed("youtube:get-info", "b", 9, Some(ErrorCode::YoutubeInfoError));
        handle.signal_delivered("window:minimize");
        handle.rejected("bogus:channel", RejectReason::UnknownChannel);
        handle.warning("state-parse-error");
        collector.process_pending();

        let summary = collector.summary();
        assert_eq!(summary.calls, 2);
        assert_eq!(summary.failed_calls, 1);
        assert_eq!(summary.signals, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.warnings, 1);
    }

    #[test]
    fn warnings_are_sanitized() {
        let mut collector = DiagnosticsCollector::default();
        collector.handle().warning("cannot read /home/erin/state.cbor");
        collector.process_pending();

        let json = collector.export_json().expect("export");
        assert!(json.contains("/home/[REDACTED]/state.cbor"));
        assert!(!json.contains("erin"));
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let collector = DiagnosticsCollector::default();
        let handle = collector.handle();
        for i in 0..(DEFAULT_CHANNEL_CAPACITY + 10) {
            handle.signal_delivered(&format!("s{i}"));
        }
        assert_eq!(collector.event_rx.len(), DEFAULT_CHANNEL_CAPACITY);
    }
}
