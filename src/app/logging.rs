// SPDX-License-Identifier: MPL-2.0
//! Logger setup for the host.
//!
//! Logs go to stderr: stdout carries the protocol. Every line passes through
//! [`sanitize_message`] so account names in paths never reach a log file.

use std::io::Write;

use crate::diagnostics::sanitize_message;

const DEFAULT_FILTER: &str = "info";

/// Installs `env_logger`. `RUST_LOG` applies unless `level` is given, in which
/// case it wins.
///
/// # Errors
///
/// Fails if a logger is already installed.
pub fn init(level: Option<&str>) -> Result<(), log::SetLoggerError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                sanitize_message(&record.args().to_string())
            )
        })
        .try_init()
}
