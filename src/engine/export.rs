// SPDX-License-Identifier: MPL-2.0
//! Export settings, the live compressed-size estimate, and the download
//! payload.

use crate::domain::editing::Quality;
use crate::engine::Editor;
use crate::error::Result;
use crate::media::{codec, ExportFormat};

/// Quality/format pair read at estimate, process, and export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSettings {
    pub quality: Quality,
    pub format: ExportFormat,
}

/// An encoded image ready to hand to the caller for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    /// Suggested download filename, `processed_image.<ext>`.
    pub filename: String,
}

impl Editor {
    /// Set the export quality (0–100).
    pub fn set_quality(&mut self, quality: Quality) {
        self.export.quality = quality;
    }

    /// Set the export format.
    pub fn set_format(&mut self, format: ExportFormat) {
        self.export.format = format;
    }

    /// The current export settings.
    #[must_use]
    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    /// Estimated output size at the current settings, for live feedback.
    ///
    /// Encodes the processed image and derives the display-only estimate
    /// from the payload length. Returns `Ok(None)` when no image is
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Encode`] if the trial encode fails.
    pub fn estimate_compressed_size(&self) -> Result<Option<u64>> {
        let Some(processed) = self.processed.as_ref() else {
            return Ok(None);
        };
        let encoded = codec::encode(processed, self.export.format, self.export.quality)?;
        Ok(Some(codec::estimated_payload_size(
            &encoded,
            self.export.format,
        )))
    }

    /// Human-readable form of [`estimate_compressed_size`](Editor::estimate_compressed_size).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Encode`] if the trial encode fails.
    pub fn estimated_size_label(&self) -> Result<Option<String>> {
        Ok(self
            .estimate_compressed_size()?
            .map(codec::format_file_size))
    }

    /// Size reduction versus the loaded payload: `Saved N%`, or
    /// `No compression` when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Encode`] if the trial encode fails.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn savings_label(&self) -> Result<Option<String>> {
        let Some(estimate) = self.estimate_compressed_size()? else {
            return Ok(None);
        };
        let Some(source) = self.source_payload.as_ref() else {
            return Ok(None);
        };
        let original = source.len().max(1) as f64;
        let reduction = ((1.0 - estimate as f64 / original) * 100.0).round() as i64;
        let label = if reduction > 0 {
            format!("Saved {reduction}%")
        } else {
            "No compression".to_string()
        };
        Ok(Some(label))
    }

    /// Encode the processed image at full resolution for download.
    ///
    /// Returns `Ok(None)` when no image is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Encode`] if the encode fails.
    pub fn export_current(&self) -> Result<Option<ExportPayload>> {
        let Some(processed) = self.processed.as_ref() else {
            return Ok(None);
        };
        let bytes = codec::encode(processed, self.export.format, self.export.quality)?;
        Ok(Some(ExportPayload {
            bytes,
            filename: format!("processed_image.{}", self.export.format.extension()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_jpeg_at_85() {
        let settings = ExportSettings::default();
        assert_eq!(settings.quality.value(), 85);
        assert_eq!(settings.format, ExportFormat::Jpeg);
    }
}
