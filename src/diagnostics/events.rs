// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types recorded around bridge dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::ErrorCode;

/// Why an inbound message never reached a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No channel with that name is registered.
    UnknownChannel,
    /// A signal channel was invoked as a call, or the reverse.
    WrongKind,
    /// The payload failed re-validation.
    InvalidPayload,
    /// The frame could not be parsed at all.
    MalformedFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEventKind {
    CallDispatched {
        channel: String,
        request_id: String,
    },
    CallCompleted {
        channel: String,
        request_id: String,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
    SignalDelivered {
        channel: String,
    },
    Rejected {
        channel: String,
        reason: RejectReason,
    },
    Warning {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: BridgeEventKind,
}

impl BridgeEvent {
    #[must_use]
    pub fn new(kind: BridgeEventKind) -> Self {
        Self { at: Utc::now(), kind }
    }

    /// `true` for completed calls that ended in a failure envelope.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            BridgeEventKind::CallCompleted {
                error_code: Some(_),
                ..
            }
        )
    }
}
