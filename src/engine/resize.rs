// SPDX-License-Identifier: MPL-2.0
//! Resize targets with aspect lock, and the committing "process" step.

use crate::engine::pending::{CommitOutcome, ProcessCompletion, ProcessRequest};
use crate::engine::Editor;
use crate::error::Result;
use image_rs::GenericImageView;

/// Target dimensions for the committing resize/compress step.
///
/// With the aspect lock enabled, editing one dimension re-derives the
/// other from the **original** image's aspect ratio (the fixed reference,
/// not the processed image's current shape).
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSettings {
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub lock_aspect: bool,
    /// Original image aspect ratio (width / height).
    original_aspect: f32,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            target_width: None,
            target_height: None,
            lock_aspect: true,
            original_aspect: 1.0,
        }
    }
}

impl ResizeSettings {
    /// Fresh settings referencing the given image's aspect ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn from_image(width: u32, height: u32) -> Self {
        Self {
            original_aspect: width.max(1) as f32 / height.max(1) as f32,
            ..Self::default()
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub(crate) fn set_width(&mut self, width: u32) {
        if width == 0 {
            return;
        }
        self.target_width = Some(width);
        if self.lock_aspect {
            let aspect = self.original_aspect.max(f32::EPSILON);
            self.target_height = Some(((width as f32 / aspect).round() as u32).max(1));
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub(crate) fn set_height(&mut self, height: u32) {
        if height == 0 {
            return;
        }
        self.target_height = Some(height);
        if self.lock_aspect {
            let aspect = self.original_aspect.max(f32::EPSILON);
            self.target_width = Some(((height as f32 * aspect).round() as u32).max(1));
        }
    }

    /// Apply a preset: both dimensions are set verbatim and the aspect
    /// lock is released so neither gets re-derived.
    pub(crate) fn apply_preset(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.target_width = Some(width);
        self.target_height = Some(height);
        self.lock_aspect = false;
    }

    /// Toggle the aspect lock; enabling it re-derives the height from the
    /// current width target.
    pub(crate) fn set_lock(&mut self, lock: bool) {
        self.lock_aspect = lock;
        if lock {
            if let Some(width) = self.target_width {
                self.set_width(width);
            }
        }
    }

    /// Resolve the targets, falling back to the given current dimensions
    /// where no valid target is set.
    #[must_use]
    pub fn resolve(&self, current_width: u32, current_height: u32) -> (u32, u32) {
        (
            self.target_width.unwrap_or(current_width).max(1),
            self.target_height.unwrap_or(current_height).max(1),
        )
    }
}

impl Editor {
    /// Set the target width; with the lock enabled the height follows.
    /// Silent no-op without a loaded image or for a zero width.
    pub fn set_target_width(&mut self, width: u32) {
        if self.original.is_some() {
            self.resize.set_width(width);
        }
    }

    /// Set the target height; with the lock enabled the width follows.
    /// Silent no-op without a loaded image or for a zero height.
    pub fn set_target_height(&mut self, height: u32) {
        if self.original.is_some() {
            self.resize.set_height(height);
        }
    }

    /// Apply a preset size (sets both targets and releases the lock).
    pub fn apply_preset(&mut self, width: u32, height: u32) {
        if self.original.is_some() {
            self.resize.apply_preset(width, height);
        }
    }

    /// Enable or disable the aspect lock.
    pub fn set_aspect_lock(&mut self, lock: bool) {
        if self.original.is_some() {
            self.resize.set_lock(lock);
        }
    }

    /// The current resize targets.
    #[must_use]
    pub fn resize_settings(&self) -> &ResizeSettings {
        &self.resize
    }

    /// Stage the committing process step: resize the processed image to
    /// the resolved targets, encode at the current quality/format, and
    /// decode the result back.
    ///
    /// Returns `None` without a loaded image. Commit the completion with
    /// [`commit_process`](Editor::commit_process).
    pub fn begin_process(&mut self) -> Option<ProcessRequest> {
        let image = self.processed.clone()?;
        let (width, height) = self.resize.resolve(image.width(), image.height());
        let generation = self.generation.advance();
        self.status.start_processing();
        Some(ProcessRequest {
            image,
            width,
            height,
            quality: self.export.quality,
            format: self.export.format,
            generation,
        })
    }

    /// Commit a finished process step.
    ///
    /// A completion whose generation has been superseded is discarded as
    /// [`CommitOutcome::Stale`] without touching the engine state.
    ///
    /// # Errors
    ///
    /// Propagates the request's encode/decode failure; prior state is
    /// untouched.
    pub fn commit_process(&mut self, completion: ProcessCompletion) -> Result<CommitOutcome> {
        if completion.generation != self.generation {
            return Ok(CommitOutcome::Stale);
        }
        self.status.finish_processing();
        let (image, encoded) = completion.result?;
        self.commit_processed(image, encoded);
        Ok(CommitOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_with_lock_derives_height() {
        let mut settings = ResizeSettings::from_image(1000, 500);
        settings.set_width(500);
        assert_eq!(settings.target_width, Some(500));
        assert_eq!(settings.target_height, Some(250));
    }

    #[test]
    fn height_with_lock_derives_width() {
        let mut settings = ResizeSettings::from_image(1000, 500);
        settings.set_height(100);
        assert_eq!(settings.target_width, Some(200));
        assert_eq!(settings.target_height, Some(100));
    }

    #[test]
    fn aspect_lock_round_trip_is_stable_within_rounding() {
        let mut settings = ResizeSettings::from_image(1920, 1080);
        settings.set_width(777);
        let derived_height = settings.target_height.unwrap();
        settings.set_height(derived_height);
        let round_tripped = settings.target_width.unwrap();
        assert!((i64::from(round_tripped) - 777i64).abs() <= 1);
    }

    #[test]
    fn zero_input_is_a_noop() {
        let mut settings = ResizeSettings::from_image(800, 600);
        settings.set_width(0);
        settings.set_height(0);
        assert_eq!(settings.target_width, None);
        assert_eq!(settings.target_height, None);
    }

    #[test]
    fn unlocked_dimensions_are_independent() {
        let mut settings = ResizeSettings::from_image(800, 600);
        settings.set_lock(false);
        settings.set_width(100);
        assert_eq!(settings.target_width, Some(100));
        assert_eq!(settings.target_height, None);
    }

    #[test]
    fn preset_sets_both_and_releases_lock() {
        let mut settings = ResizeSettings::from_image(800, 600);
        settings.apply_preset(1280, 720);
        assert_eq!(settings.target_width, Some(1280));
        assert_eq!(settings.target_height, Some(720));
        assert!(!settings.lock_aspect);
    }

    #[test]
    fn re_enabling_lock_re_derives_height() {
        let mut settings = ResizeSettings::from_image(1000, 500);
        settings.apply_preset(400, 400);
        settings.set_lock(true);
        assert_eq!(settings.target_width, Some(400));
        assert_eq!(settings.target_height, Some(200));
    }

    #[test]
    fn resolve_falls_back_to_current_dimensions() {
        let settings = ResizeSettings::from_image(800, 600);
        assert_eq!(settings.resolve(640, 480), (640, 480));

        let mut with_width = ResizeSettings::from_image(800, 600);
        with_width.set_lock(false);
        with_width.set_width(320);
        assert_eq!(with_width.resolve(640, 480), (320, 480));
    }
}
