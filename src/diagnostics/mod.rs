// SPDX-License-Identifier: MPL-2.0
//! Bridge diagnostics: path sanitization plus a bounded event log.
//!
//! - [`sanitize_message`] scrubs home-directory account names from any text
//!   that leaves the privileged process.
//! - [`DiagnosticsCollector`] stores [`BridgeEvent`]s in a [`CircularBuffer`]
//!   and exports them as JSON.

mod buffer;
mod collector;
mod events;
mod sanitizer;

pub use buffer::{BufferCapacity, CircularBuffer};
pub use collector::{DiagnosticsCollector, DiagnosticsHandle, EventSummary};
pub use events::{BridgeEvent, BridgeEventKind, RejectReason};
pub use sanitizer::sanitize_message;
