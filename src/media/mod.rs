// SPDX-License-Identifier: MPL-2.0
//! Image payload handling: upload validation, codecs, and transforms.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Validate** | MIME prefix + size cap, before any decode |
//! | **Decode** | `image::load_from_memory` |
//! | **Encode** | JPEG (`JpegEncoder`, quality-aware), PNG, WebP |
//! | **Resize / Crop** | Lanczos3 `resize_exact` + `crop_imm` |

pub mod codec;
pub mod format;
pub mod transform;

pub use format::ExportFormat;

use crate::error::{Error, Result};

/// Validate an incoming payload before any decode work.
///
/// The declared MIME type must describe an image and the payload must not
/// exceed the configured size limit. Both checks run before any state is
/// touched, so a rejected upload leaves the engine unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidFileType`] or [`Error::FileTooLarge`].
pub fn validate_upload(mime: &str, len: u64, limit: u64) -> Result<()> {
    if !mime.starts_with("image/") {
        return Err(Error::InvalidFileType(mime.to_string()));
    }
    if len > limit {
        return Err(Error::FileTooLarge { size: len, limit });
    }
    Ok(())
}

/// Guess the MIME type for a known image file extension.
///
/// Covers the formats the decoder is built with; callers that load from
/// disk use this to fill the declared MIME type an upload would carry.
#[must_use]
pub fn guess_mime(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}
