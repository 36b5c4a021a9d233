// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Window**: initial and minimum window size
//! - **Image**: encoder quality bounds
//! - **Video**: default codecs
//! - **Diagnostics**: bridge event buffer bounds
//! - **Protocol**: request id and frame limits

// ==========================================================================
// Window Defaults
// ==========================================================================

/// Initial window width before any bounds were persisted.
pub const DEFAULT_WINDOW_WIDTH: u32 = 1024;

/// Initial window height before any bounds were persisted.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 768;

pub const MIN_WINDOW_WIDTH: u32 = 900;

pub const MIN_WINDOW_HEIGHT: u32 = 600;

// ==========================================================================
// Image Defaults
// ==========================================================================

/// Quality used when `image:convert` omits one.
pub const DEFAULT_IMAGE_QUALITY: u8 = 80;

pub const MIN_IMAGE_QUALITY: u8 = 1;

pub const MAX_IMAGE_QUALITY: u8 = 100;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
pub const AVIF_ENCODER_SPEED: u8 = 6;

// ==========================================================================
// Video Defaults
// ==========================================================================

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

pub const DEFAULT_AUDIO_CODEC: &str = "aac";

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

pub const DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY: usize = 512;

pub const MIN_DIAGNOSTICS_BUFFER_CAPACITY: usize = 64;

pub const MAX_DIAGNOSTICS_BUFFER_CAPACITY: usize = 4096;

// ==========================================================================
// Protocol Limits
// ==========================================================================

/// Longest accepted correlation id, in bytes.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Longest accepted inbound frame, in bytes.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_WINDOW_WIDTH <= DEFAULT_WINDOW_WIDTH);
    assert!(MIN_WINDOW_HEIGHT <= DEFAULT_WINDOW_HEIGHT);

    assert!(MIN_IMAGE_QUALITY > 0);
    assert!(DEFAULT_IMAGE_QUALITY >= MIN_IMAGE_QUALITY);
    assert!(DEFAULT_IMAGE_QUALITY <= MAX_IMAGE_QUALITY);
    assert!(AVIF_ENCODER_SPEED >= 1 && AVIF_ENCODER_SPEED <= 10);

    assert!(MIN_DIAGNOSTICS_BUFFER_CAPACITY > 0);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY >= MIN_DIAGNOSTICS_BUFFER_CAPACITY);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY <= MAX_DIAGNOSTICS_BUFFER_CAPACITY);

    assert!(MAX_REQUEST_ID_LEN > 0);
};
