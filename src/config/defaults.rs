// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the engine. Constants are organized by category.
//!
//! # Categories
//!
//! - **Upload**: Validation limits for incoming image payloads
//! - **Preview**: Bounded display surface dimensions
//! - **History**: Undo/redo snapshot retention
//! - **Export**: Compression quality defaults
//! - **Crop**: Crop rectangle sizing and limits
//! - **Smart Crop**: Saliency search strides

// ==========================================================================
// Upload Defaults
// ==========================================================================

/// Maximum accepted payload size in megabytes.
pub const MAX_FILE_SIZE_MB: u64 = 50;

/// Maximum accepted payload size in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;

// ==========================================================================
// Preview Defaults
// ==========================================================================

/// Maximum preview surface width in logical pixels.
pub const PREVIEW_MAX_WIDTH: u32 = 600;

/// Maximum preview surface height in logical pixels.
pub const PREVIEW_MAX_HEIGHT: u32 = 400;

// ==========================================================================
// History Defaults
// ==========================================================================

/// Maximum number of snapshots retained for undo/redo.
pub const HISTORY_CAPACITY: usize = 10;

// ==========================================================================
// Export Defaults
// ==========================================================================

/// Default compression quality (0-100).
pub const DEFAULT_QUALITY: u8 = 85;

// ==========================================================================
// Crop Defaults
// ==========================================================================

/// Preferred edge length for a fresh crop rectangle, in canvas pixels.
pub const INITIAL_CROP_SIZE: f32 = 200.0;

/// Fraction of the canvas a fresh crop rectangle may cover at most.
pub const CROP_CANVAS_FRACTION: f32 = 0.8;

/// Minimum crop rectangle edge length, in canvas pixels.
pub const MIN_CROP_DIM: f32 = 50.0;

// ==========================================================================
// Smart Crop Defaults
// ==========================================================================

/// Grid step for sliding the candidate window across the source image.
pub const SMART_CROP_WINDOW_STEP: u32 = 10;

/// Grid step for sampling importance inside a candidate window.
pub const SMART_CROP_SAMPLE_STEP: u32 = 5;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Upload validation
    assert!(MAX_FILE_SIZE_MB > 0);

    // Preview validation
    assert!(PREVIEW_MAX_WIDTH > 0);
    assert!(PREVIEW_MAX_HEIGHT > 0);

    // History validation
    assert!(HISTORY_CAPACITY >= 1);

    // Export validation
    assert!(DEFAULT_QUALITY <= 100);

    // Crop validation
    assert!(MIN_CROP_DIM > 0.0);
    assert!(INITIAL_CROP_SIZE >= MIN_CROP_DIM);
    assert!(CROP_CANVAS_FRACTION > 0.0);
    assert!(CROP_CANVAS_FRACTION <= 1.0);

    // Smart crop validation
    assert!(SMART_CROP_WINDOW_STEP >= 1);
    assert!(SMART_CROP_SAMPLE_STEP >= 1);
};
