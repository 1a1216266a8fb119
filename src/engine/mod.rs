// SPDX-License-Identifier: MPL-2.0
//! Image editing engine with resize, crop, smart crop, and bounded
//! undo/redo history.
//!
//! This module follows a "state down, completions up" pattern: the
//! [`Editor`] owns every piece of mutable state (there are no ambient
//! globals), interactive operations mutate synchronously, and the heavy
//! decode/encode operations are staged through generation-tagged requests
//! (see [`pending`]) so a stale completion can never overwrite newer
//! state.

pub mod crop;
pub mod export;
pub mod geometry;
pub mod history;
pub mod pending;
pub mod resize;
pub mod smart_crop;
pub mod status;

pub use crop::{CropRatio, CropSession};
pub use export::{ExportPayload, ExportSettings};
pub use geometry::{CanvasSize, CropRect, HandlePosition, SourceRect};
pub use history::{Snapshot, SnapshotHistory};
pub use pending::{
    CommitOutcome, Generation, LoadCompletion, LoadRequest, ProcessCompletion, ProcessRequest,
    SmartCropCompletion, SmartCropRequest,
};
pub use resize::ResizeSettings;
pub use status::ProcessingState;

use crate::config::EngineSettings;
use crate::error::Result;
use crate::media::{self, codec};
use image_rs::{DynamicImage, GenericImageView};
use std::sync::Arc;

/// The image editing session.
///
/// Owns the original and processed images, the snapshot history, an
/// optional crop session, and the resize/export settings. All operations
/// that require a loaded image are silent no-ops until one arrives.
#[derive(Clone)]
pub struct Editor {
    settings: EngineSettings,
    /// Decoded source image; immutable once loaded.
    original: Option<Arc<DynamicImage>>,
    /// Result of the edit chain; replaced by each committed operation.
    processed: Option<Arc<DynamicImage>>,
    /// The payload as loaded, reused for history entry zero and reset.
    source_payload: Option<Snapshot>,
    history: SnapshotHistory,
    crop: Option<CropSession>,
    /// Persistent ratio selection (outlives crop sessions; the smart crop
    /// reads it too).
    crop_ratio: CropRatio,
    resize: ResizeSettings,
    export: ExportSettings,
    generation: Generation,
    status: ProcessingState,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("has_image", &self.original.is_some())
            .field("history_len", &self.history.len())
            .field("crop_ratio", &self.crop_ratio)
            .field("is_cropping", &self.crop.is_some())
            .field("export", &self.export)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// An engine with the built-in default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    /// An engine with explicit settings (typically resolved from config).
    #[must_use]
    pub fn with_settings(settings: EngineSettings) -> Self {
        let history = SnapshotHistory::new(settings.history_capacity);
        let export = ExportSettings {
            quality: settings.default_quality,
            format: settings.default_format,
        };
        Self {
            settings,
            original: None,
            processed: None,
            source_payload: None,
            history,
            crop: None,
            crop_ratio: CropRatio::Free,
            resize: ResizeSettings::default(),
            export,
            generation: Generation::default(),
            status: ProcessingState::default(),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Validate an incoming payload and stage its decode.
    ///
    /// Validation (MIME prefix, size limit) runs before anything else and
    /// a failure leaves the engine untouched. Commit the completion with
    /// [`commit_load`](Editor::commit_load).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidFileType`] or
    /// [`crate::error::Error::FileTooLarge`].
    pub fn begin_load(&mut self, bytes: Vec<u8>, mime: &str) -> Result<LoadRequest> {
        media::validate_upload(mime, bytes.len() as u64, self.settings.max_file_size)?;
        let generation = self.generation.advance();
        self.status.start_processing();
        Ok(LoadRequest { bytes, generation })
    }

    /// Commit a finished load.
    ///
    /// Replaces both the original and the processed image, resets the
    /// history to a single entry holding the loaded payload, discards any
    /// crop session, and re-references the resize settings to the new
    /// image. A superseded completion is discarded as
    /// [`CommitOutcome::Stale`].
    ///
    /// # Errors
    ///
    /// Propagates the decode failure; prior state is untouched.
    pub fn commit_load(&mut self, completion: LoadCompletion) -> Result<CommitOutcome> {
        if completion.generation != self.generation {
            return Ok(CommitOutcome::Stale);
        }
        self.status.finish_processing();
        let image = completion.result?;
        let (width, height) = image.dimensions();

        let image = Arc::new(image);
        let payload: Snapshot = Arc::new(completion.bytes);
        self.original = Some(Arc::clone(&image));
        self.processed = Some(image);
        self.source_payload = Some(Arc::clone(&payload));
        self.history.reset(payload);
        self.crop = None;
        self.resize = ResizeSettings::from_image(width, height);
        self.generation.advance();
        Ok(CommitOutcome::Committed)
    }

    /// Validate, decode, and commit a payload in one synchronous call.
    ///
    /// # Errors
    ///
    /// Returns the validation or decode failure; the engine is untouched
    /// in that case.
    pub fn load_image(&mut self, bytes: Vec<u8>, mime: &str) -> Result<()> {
        let request = self.begin_load(bytes, mime)?;
        self.commit_load(request.run()).map(|_| ())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether an image is loaded.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.original.is_some()
    }

    /// The resolved engine settings.
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The generation of the current state (for diagnostics).
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Progress state of the staged operation in flight, if any.
    #[must_use]
    pub fn processing_status(&self) -> ProcessingState {
        self.status
    }

    /// Update the displayed progress of the operation in flight.
    pub fn set_processing_progress(&mut self, progress: f32) {
        self.status.set_progress(progress);
    }

    /// Dimensions of the original image.
    #[must_use]
    pub fn original_dimensions(&self) -> Option<(u32, u32)> {
        self.original.as_ref().map(|img| img.dimensions())
    }

    /// Dimensions of the processed image.
    #[must_use]
    pub fn processed_dimensions(&self) -> Option<(u32, u32)> {
        self.processed.as_ref().map(|img| img.dimensions())
    }

    /// The processed image (for rendering adapters).
    #[must_use]
    pub fn processed_image(&self) -> Option<&Arc<DynamicImage>> {
        self.processed.as_ref()
    }

    /// Dimensions of the bounded preview surface for the processed image.
    #[must_use]
    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.processed.as_ref().map(|img| {
            CanvasSize::of_image(
                img.width(),
                img.height(),
                self.settings.preview_max_width,
                self.settings.preview_max_height,
            )
        })
    }

    /// Status string of the processed dimensions (`W × H`).
    #[must_use]
    pub fn dimensions_label(&self) -> Option<String> {
        self.processed_dimensions()
            .map(|(width, height)| format!("{width} × {height}"))
    }

    /// Human-readable size of the loaded payload.
    #[must_use]
    pub fn original_size_label(&self) -> Option<String> {
        self.source_payload
            .as_ref()
            .map(|payload| codec::format_file_size(payload.len() as u64))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Whether an undo step is currently possible.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is currently possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots currently retained.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Step back one snapshot, re-decoding it into the processed image.
    ///
    /// Returns `Ok(false)` at the boundary.
    ///
    /// # Errors
    ///
    /// Returns the snapshot decode failure; the cursor and the processed
    /// image are untouched in that case.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.peek_back().cloned() else {
            return Ok(false);
        };
        let decoded = codec::decode(&snapshot)?;
        self.history.step_back();
        self.processed = Some(Arc::new(decoded));
        self.generation.advance();
        Ok(true)
    }

    /// Step forward one snapshot, re-decoding it into the processed image.
    ///
    /// Returns `Ok(false)` at the boundary.
    ///
    /// # Errors
    ///
    /// Returns the snapshot decode failure; the cursor and the processed
    /// image are untouched in that case.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(snapshot) = self.history.peek_forward().cloned() else {
            return Ok(false);
        };
        let decoded = codec::decode(&snapshot)?;
        self.history.step_forward();
        self.processed = Some(Arc::new(decoded));
        self.generation.advance();
        Ok(true)
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Restore the processed image to the original and the settings to
    /// their defaults (quality 85, JPEG, aspect lock on).
    ///
    /// The restoration is committed to history like any other edit, so
    /// reset is undoable and a later undo can never land on an unrelated
    /// branch. When nothing was edited the history is left alone.
    pub fn reset(&mut self) {
        let Some(original) = self.original.clone() else {
            return;
        };
        let Some(payload) = self.source_payload.clone() else {
            return;
        };

        self.crop = None;
        self.resize = ResizeSettings::from_image(original.width(), original.height());
        self.export = ExportSettings::default();

        let unchanged = self
            .processed
            .as_ref()
            .is_some_and(|processed| Arc::ptr_eq(processed, &original));
        if !unchanged {
            self.processed = Some(original);
            self.history.push(payload);
            self.generation.advance();
        }
    }

    // =========================================================================
    // Internal commit helper
    // =========================================================================

    /// Replace the processed image and push its encoded snapshot.
    pub(crate) fn commit_processed(&mut self, image: DynamicImage, encoded: Vec<u8>) {
        self.processed = Some(Arc::new(image));
        self.history.push(Arc::new(encoded));
        self.generation.advance();
    }
}
