// SPDX-License-Identifier: MPL-2.0
//! Application layer.
//!
//! - [`port`]: trait definitions for the privileged side's collaborators
//!
//! # Dependency Rule
//!
//! - The application layer depends on the domain layer only
//! - Infrastructure implements the ports
//! - The bridge's handlers consume the ports through `BridgeContext`

pub mod port;
