// SPDX-License-Identifier: MPL-2.0
//! The typed request/response bridge between the presentation process and the
//! privileged host.
//!
//! A fixed set of named [`Channel`]s is the whole surface. Calls carry a
//! [`Request`] and always yield one [`Envelope`] with the same id; signals are
//! one-way. Payloads are re-validated on the privileged side before any
//! handler runs, and every failure is normalized into a [`BridgeError`] with a
//! stable [`ErrorCode`].
//!
//! # Modules
//!
//! - [`channel`]: the channel table
//! - [`envelope`]: request ids, requests and envelopes
//! - [`error`]: error codes and collaborator error mapping
//! - [`payload`]: wire payloads and their validation
//! - [`response`]: success data per channel
//! - [`context`]: state and collaborators shared by handlers
//! - [`dispatch`]: routing, panic containment and diagnostics
//! - [`transport`]: newline-delimited JSON framing for the host side
//! - [`client`]: typed presentation-side client and its transports

pub mod channel;
pub mod client;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;
mod handlers;
pub mod payload;
pub mod response;
pub mod transport;

pub use channel::{Channel, ChannelKind, UnknownChannel};
pub use client::{BatchReport, BridgeClient, InProcessTransport, LineTransport, Transport};
pub use context::{BridgeContext, Collaborators};
pub use dispatch::Dispatcher;
pub use envelope::{now_millis, Envelope, RawRequest, Request, RequestId};
pub use error::{BridgeError, ErrorCode};
pub use payload::{CallRequest, SignalRequest};
pub use transport::{serve, InboundFrame};
