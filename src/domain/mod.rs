// SPDX-License-Identifier: MPL-2.0
//! Domain layer: value types shared by both sides of the bridge.
//!
//! Nothing here performs I/O. Types serialize with the camelCase wire names the
//! presentation side expects.
//!
//! # Modules
//!
//! - [`conversion`]: image/video option value objects and output path rules
//! - [`file`]: [`SelectedFile`](file::SelectedFile), its status lifecycle and
//!   the presentation-side [`WorkingSet`](file::WorkingSet)
//! - [`navigation`]: active tool tracking
//! - [`window`]: main window geometry
//! - [`youtube`]: extracted video descriptions

pub mod conversion;
pub mod file;
pub mod navigation;
pub mod window;
pub mod youtube;
