// SPDX-License-Identifier: MPL-2.0
//! Export format selection for processed images.
//!
//! This module provides the fixed set of formats the engine can encode to
//! (JPEG, PNG, WebP) using the `image` crate.

use image_rs::ImageFormat;
use std::path::Path;

/// Supported export formats for processed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JPEG format (lossy, smaller file size).
    #[default]
    Jpeg,
    /// PNG format (lossless, best quality).
    Png,
    /// WebP format (modern, good compression).
    WebP,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    ///
    /// The JPEG extension is spelled out in full because the download
    /// filename is derived directly from the format token.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
            ExportFormat::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// Returns the image format for the `image` crate.
    pub(crate) fn image_format(self) -> ImageFormat {
        match self {
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "JPEG (Lossy)",
            ExportFormat::Png => "PNG (Lossless)",
            ExportFormat::WebP => "WebP (Modern)",
        }
    }

    /// Returns all supported formats.
    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Jpeg, ExportFormat::Png, ExportFormat::WebP]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "png" => Some(ExportFormat::Png),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    /// Detects format from file path extension.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}
