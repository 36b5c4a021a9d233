// SPDX-License-Identifier: MPL-2.0
//! `zenconvert` is the privileged half of the ZenConvert media utility.
//!
//! A presentation process asks for dialogs, window changes, file checks and
//! media conversions over a narrow, typed bridge; this crate validates every
//! request, runs it against wrapped native tools (`image`, `ffmpeg`,
//! `yt-dlp`) and answers with a correlated envelope.
//!
//! The layers follow the usual split: [`domain`] holds plain value types,
//! [`application::port`] the collaborator traits, [`infrastructure`] their
//! adapters, and [`bridge`] the protocol itself.

#![doc(html_root_url = "https://docs.rs/zenconvert/0.3.0")]

pub mod app;
pub mod application;
pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod infrastructure;
