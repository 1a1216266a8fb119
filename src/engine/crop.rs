// SPDX-License-Identifier: MPL-2.0
//! Crop session state and helpers.

use crate::config::defaults;
use crate::domain::editing::Quality;
use crate::engine::geometry::{CanvasSize, CropRect, HandlePosition};
use crate::engine::Editor;
use crate::error::Result;
use crate::media::{codec, transform, ExportFormat};
use image_rs::GenericImageView;

/// Crop aspect ratio constraint: free-form or a fixed `W:H`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropRatio {
    #[default]
    Free,
    Fixed {
        w: u32,
        h: u32,
    },
}

impl CropRatio {
    /// Parse a ratio token: `free` or `W:H` with positive integers.
    #[must_use]
    pub fn parse(token: &str) -> Option<CropRatio> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("free") {
            return Some(CropRatio::Free);
        }
        let (w, h) = token.split_once(':')?;
        let w: u32 = w.parse().ok()?;
        let h: u32 = h.parse().ok()?;
        if w == 0 || h == 0 {
            return None;
        }
        Some(CropRatio::Fixed { w, h })
    }

    /// Width-over-height value of a fixed ratio, `None` when free.
    #[must_use]
    pub fn value(self) -> Option<f32> {
        match self {
            CropRatio::Free => None,
            #[allow(clippy::cast_precision_loss)]
            CropRatio::Fixed { w, h } => Some(w as f32 / h as f32),
        }
    }

    /// The token form of this ratio (`free` or `W:H`).
    #[must_use]
    pub fn label(self) -> String {
        match self {
            CropRatio::Free => "free".to_string(),
            CropRatio::Fixed { w, h } => format!("{w}:{h}"),
        }
    }
}

/// An active crop selection over the preview canvas.
///
/// The canvas dimensions are captured when the session starts and stay
/// fixed for its lifetime, like the rendered preview they mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    pub rect: CropRect,
    pub ratio: CropRatio,
    pub canvas: CanvasSize,
}

impl CropSession {
    /// Start a session with a centered rectangle sized to the canvas and
    /// constrained to the requested ratio (shrinking the oversized axis).
    pub(crate) fn new(canvas: CanvasSize, ratio: CropRatio) -> Self {
        let mut width = (canvas.width * defaults::CROP_CANVAS_FRACTION).min(defaults::INITIAL_CROP_SIZE);
        let mut height =
            (canvas.height * defaults::CROP_CANVAS_FRACTION).min(defaults::INITIAL_CROP_SIZE);

        if let Some(r) = ratio.value() {
            if width / height > r {
                width = height * r;
            } else {
                height = width / r;
            }
        }

        let rect = CropRect {
            left: (canvas.width - width) / 2.0,
            top: (canvas.height - height) / 2.0,
            width,
            height,
        };

        Self {
            rect,
            ratio,
            canvas,
        }
    }

    /// Switch the ratio constraint, re-deriving the rectangle from its
    /// current size (prefer shrinking over growing).
    pub(crate) fn set_ratio(&mut self, ratio: CropRatio) {
        self.ratio = ratio;
        if let Some(r) = ratio.value() {
            self.rect = self.rect.constrained_to_ratio(r, self.canvas);
        }
    }

    pub(crate) fn drag(&mut self, dx: f32, dy: f32) {
        self.rect = self.rect.translated(dx, dy, self.canvas);
    }

    pub(crate) fn resize(&mut self, handle: HandlePosition, dx: f32, dy: f32) {
        self.rect = self.rect.resized(
            handle,
            dx,
            dy,
            self.canvas,
            defaults::MIN_CROP_DIM,
            self.ratio.value(),
        );
    }

    /// Current selection size as a `W × H` status string.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn size_label(&self) -> String {
        format!(
            "{} × {}",
            self.rect.width.round() as u32,
            self.rect.height.round() as u32
        )
    }
}

impl Editor {
    /// Enter crop mode with the given ratio constraint.
    ///
    /// Re-entering while a session is active reuses the session and only
    /// updates its ratio. Without a loaded image this is a silent no-op.
    pub fn begin_crop(&mut self, ratio: CropRatio) {
        self.crop_ratio = ratio;
        if let Some(session) = &mut self.crop {
            session.set_ratio(ratio);
            return;
        }
        let Some(canvas) = self.canvas_size() else {
            return;
        };
        self.crop = Some(CropSession::new(canvas, ratio));
    }

    /// Select the active ratio constraint.
    ///
    /// The selection persists outside crop mode (the smart crop uses it);
    /// an active session re-derives its rectangle immediately.
    pub fn set_crop_ratio(&mut self, ratio: CropRatio) {
        self.crop_ratio = ratio;
        if let Some(session) = &mut self.crop {
            session.set_ratio(ratio);
        }
    }

    /// Move the crop rectangle by the given canvas-space delta.
    pub fn drag_crop(&mut self, dx: f32, dy: f32) {
        if let Some(session) = &mut self.crop {
            session.drag(dx, dy);
        }
    }

    /// Resize the crop rectangle from a corner handle.
    pub fn resize_crop(&mut self, handle: HandlePosition, dx: f32, dy: f32) {
        if let Some(session) = &mut self.crop {
            session.resize(handle, dx, dy);
        }
    }

    /// Commit the crop selection.
    ///
    /// The rectangle is mapped from canvas space into source-image
    /// coordinates, the sub-region is extracted from the original image,
    /// and the result becomes the processed image with a lossless snapshot
    /// pushed to history. Exits crop mode. Silent no-op without an image
    /// or an active session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Encode`] if the snapshot encode
    /// fails; the engine state is left untouched in that case.
    pub fn apply_crop(&mut self) -> Result<()> {
        let Some(original) = self.original.clone() else {
            return Ok(());
        };
        let Some(session) = self.crop.as_ref() else {
            return Ok(());
        };

        let source = session
            .rect
            .to_source(session.canvas, original.width(), original.height());
        let Some(cropped) =
            transform::crop(&original, source.x, source.y, source.width, source.height)
        else {
            return Ok(());
        };

        let encoded = codec::encode(&cropped, ExportFormat::Png, Quality::default())?;
        self.crop = None;
        self.commit_processed(cropped, encoded);
        Ok(())
    }

    /// Leave crop mode without committing, discarding the selection.
    pub fn cancel_crop(&mut self) {
        self.crop = None;
    }

    /// The active crop session, if any.
    #[must_use]
    pub fn crop_session(&self) -> Option<&CropSession> {
        self.crop.as_ref()
    }

    /// Whether a crop session is active.
    #[must_use]
    pub fn is_cropping(&self) -> bool {
        self.crop.is_some()
    }

    /// The persistent ratio selection.
    #[must_use]
    pub fn crop_ratio(&self) -> CropRatio {
        self.crop_ratio
    }

    /// Status string for the active selection size.
    #[must_use]
    pub fn crop_size_label(&self) -> Option<String> {
        self.crop.as_ref().map(CropSession::size_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_free_and_fixed_tokens() {
        assert_eq!(CropRatio::parse("free"), Some(CropRatio::Free));
        assert_eq!(CropRatio::parse("FREE"), Some(CropRatio::Free));
        assert_eq!(
            CropRatio::parse("16:9"),
            Some(CropRatio::Fixed { w: 16, h: 9 })
        );
        assert_eq!(CropRatio::parse("1:1"), Some(CropRatio::Fixed { w: 1, h: 1 }));
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        assert_eq!(CropRatio::parse("16x9"), None);
        assert_eq!(CropRatio::parse("0:1"), None);
        assert_eq!(CropRatio::parse("4:0"), None);
        assert_eq!(CropRatio::parse("-4:3"), None);
        assert_eq!(CropRatio::parse(""), None);
    }

    #[test]
    fn ratio_value_and_label_round_trip() {
        let ratio = CropRatio::Fixed { w: 4, h: 3 };
        assert!((ratio.value().unwrap() - 4.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(ratio.label(), "4:3");
        assert_eq!(CropRatio::Free.value(), None);
        assert_eq!(CropRatio::Free.label(), "free");
    }

    #[test]
    fn new_session_centers_rectangle() {
        let canvas = CanvasSize::new(600.0, 300.0);
        let session = CropSession::new(canvas, CropRatio::Free);

        // 200 is below 80% of both axes, so the rect is 200x200, centered
        assert_eq!(session.rect.width, 200.0);
        assert_eq!(session.rect.height, 200.0);
        assert_eq!(session.rect.left, 200.0);
        assert_eq!(session.rect.top, 50.0);
    }

    #[test]
    fn new_session_shrinks_to_small_canvas() {
        let canvas = CanvasSize::new(100.0, 80.0);
        let session = CropSession::new(canvas, CropRatio::Free);

        assert_eq!(session.rect.width, 80.0);
        assert_eq!(session.rect.height, 64.0);
    }

    #[test]
    fn new_session_applies_fixed_ratio() {
        let canvas = CanvasSize::new(600.0, 300.0);
        let session = CropSession::new(canvas, CropRatio::Fixed { w: 1, h: 1 });
        assert_eq!(session.rect.width, session.rect.height);
    }

    #[test]
    fn ratio_change_re_derives_current_rectangle() {
        let canvas = CanvasSize::new(600.0, 300.0);
        let mut session = CropSession::new(canvas, CropRatio::Free);
        session.set_ratio(CropRatio::Fixed { w: 4, h: 3 });

        let ratio = session.rect.width / session.rect.height;
        assert!((ratio - 4.0 / 3.0).abs() < 1e-3);
        assert!(session.rect.within(canvas));
    }

    #[test]
    fn size_label_rounds_to_whole_pixels() {
        let canvas = CanvasSize::new(600.0, 300.0);
        let mut session = CropSession::new(canvas, CropRatio::Free);
        session.rect.width = 150.4;
        session.rect.height = 99.6;
        assert_eq!(session.size_label(), "150 × 100");
    }
}
