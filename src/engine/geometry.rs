// SPDX-License-Identifier: MPL-2.0
//! Pure geometry for the preview surface and the crop rectangle.
//!
//! All functions here operate on explicit numeric records and are
//! decoupled from any rendering surface. The rendering layer (out of
//! scope for this crate) is expected to be a thin adapter that reads and
//! writes these records.
//!
//! Image dimension conversions between u32 and f32 for display/calculations.
//! Precision loss is acceptable for typical image sizes.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

/// Position of a resize handle on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Logical dimensions of the bounded preview surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Canvas dimensions for an image shown inside the given bounding box.
    #[must_use]
    pub fn of_image(img_width: u32, img_height: u32, max_width: u32, max_height: u32) -> Self {
        let (width, height) = display_size(img_width, img_height, max_width, max_height);
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Scale an image to fit within a bounding box, preserving aspect ratio.
///
/// The scale factor is `min(max_width / img_width, max_height / img_height)`
/// and both results are floored to whole pixels (at least 1).
#[must_use]
pub fn display_size(
    img_width: u32,
    img_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    let img_width = img_width.max(1);
    let img_height = img_height.max(1);
    let ratio = (f64::from(max_width) / f64::from(img_width))
        .min(f64::from(max_height) / f64::from(img_height));
    let width = (f64::from(img_width) * ratio).floor() as u32;
    let height = (f64::from(img_height) * ratio).floor() as u32;
    (width.max(1), height.max(1))
}

/// Crop rectangle in canvas (display) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Crop rectangle mapped into source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Rectangle moved by the given delta, with its origin clamped per axis
    /// so the rectangle stays inside the canvas.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32, canvas: CanvasSize) -> Self {
        Self {
            left: (self.left + dx).min(canvas.width - self.width).max(0.0),
            top: (self.top + dy).min(canvas.height - self.height).max(0.0),
            ..*self
        }
    }

    /// Rectangle resized by dragging a corner handle.
    ///
    /// The two edges adjacent to the handle move; the opposite edges stay
    /// fixed. Both dimensions respect `min_dim` before ratio correction.
    /// With a fixed ratio, the dimension that exceeds the ratio is re-derived
    /// from the other (width drives on a tie). The result is clamped into the
    /// canvas, and the ratio is re-asserted after clamping so boundary
    /// shrinking cannot leave the rectangle off-ratio.
    #[must_use]
    pub fn resized(
        &self,
        handle: HandlePosition,
        dx: f32,
        dy: f32,
        canvas: CanvasSize,
        min_dim: f32,
        ratio: Option<f32>,
    ) -> Self {
        let mut left = self.left;
        let mut top = self.top;
        let mut width = self.width;
        let mut height = self.height;

        match handle {
            HandlePosition::TopLeft => {
                left = (self.left + dx).max(0.0);
                top = (self.top + dy).max(0.0);
                width = (self.width - dx).max(min_dim);
                height = (self.height - dy).max(min_dim);
            }
            HandlePosition::TopRight => {
                top = (self.top + dy).max(0.0);
                width = (self.width + dx).max(min_dim);
                height = (self.height - dy).max(min_dim);
            }
            HandlePosition::BottomLeft => {
                left = (self.left + dx).max(0.0);
                width = (self.width - dx).max(min_dim);
                height = (self.height + dy).max(min_dim);
            }
            HandlePosition::BottomRight => {
                width = (self.width + dx).max(min_dim);
                height = (self.height + dy).max(min_dim);
            }
        }

        if let Some(r) = ratio {
            (width, height) = corrected_to_ratio(width, height, r);
        }

        left = left.min(canvas.width - width).max(0.0);
        top = top.min(canvas.height - height).max(0.0);
        width = width.min(canvas.width - left);
        height = height.min(canvas.height - top);

        // Boundary clamping only shrinks, so re-deriving shrinks further and
        // keeps the rectangle inside the canvas.
        if let Some(r) = ratio {
            (width, height) = corrected_to_ratio(width, height, r);
        }

        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle re-derived from its current size for a new fixed ratio,
    /// shrinking whichever axis is oversized, then re-clamped to the canvas.
    #[must_use]
    pub fn constrained_to_ratio(&self, ratio: f32, canvas: CanvasSize) -> Self {
        let (mut width, mut height) = corrected_to_ratio(self.width, self.height, ratio);

        let max_width = canvas.width - self.left;
        let max_height = canvas.height - self.top;
        if width > max_width {
            width = max_width;
            height = width / ratio;
        }
        if height > max_height {
            height = max_height;
            width = height * ratio;
        }

        Self {
            width,
            height,
            ..*self
        }
    }

    /// Map this canvas-space rectangle into source-image pixel space using
    /// independent per-axis scales, rounding to whole pixels.
    #[must_use]
    pub fn to_source(&self, canvas: CanvasSize, src_width: u32, src_height: u32) -> SourceRect {
        let scale_x = f64::from(src_width) / f64::from(canvas.width.max(1.0));
        let scale_y = f64::from(src_height) / f64::from(canvas.height.max(1.0));
        SourceRect {
            x: (f64::from(self.left) * scale_x).round() as u32,
            y: (f64::from(self.top) * scale_y).round() as u32,
            width: ((f64::from(self.width) * scale_x).round() as u32).max(1),
            height: ((f64::from(self.height) * scale_y).round() as u32).max(1),
        }
    }

    /// Whether the rectangle lies fully inside the canvas, within a small
    /// display-space tolerance (float rounding near the edges is below
    /// any visible fraction of a pixel).
    #[must_use]
    pub fn within(&self, canvas: CanvasSize) -> bool {
        const TOLERANCE: f32 = 1e-3;
        self.left >= -TOLERANCE
            && self.top >= -TOLERANCE
            && self.left + self.width <= canvas.width + TOLERANCE
            && self.top + self.height <= canvas.height + TOLERANCE
    }
}

/// Shrink one dimension so `width / height` matches the ratio: width is
/// re-derived from height when the rectangle is wider than the ratio,
/// height from width otherwise (width drives on a tie).
fn corrected_to_ratio(width: f32, height: f32, ratio: f32) -> (f32, f32) {
    if width / height > ratio {
        (height * ratio, height)
    } else {
        (width, width / ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize {
        width: 600.0,
        height: 300.0,
    };
    const MIN_DIM: f32 = 50.0;

    fn rect(left: f32, top: f32, width: f32, height: f32) -> CropRect {
        CropRect {
            left,
            top,
            width,
            height,
        }
    }

    // -------------------------------------------------------------------------
    // display_size tests
    // -------------------------------------------------------------------------

    #[test]
    fn display_size_fits_wide_image() {
        assert_eq!(display_size(1000, 500, 600, 400), (600, 300));
    }

    #[test]
    fn display_size_fits_tall_image() {
        assert_eq!(display_size(500, 1000, 600, 400), (200, 400));
    }

    #[test]
    fn display_size_never_upscales_beyond_box() {
        for (w, h) in [(1, 1), (37, 911), (4096, 17), (600, 400), (601, 401)] {
            let (dw, dh) = display_size(w, h, 600, 400);
            assert!(dw <= 600, "{w}x{h} -> {dw}x{dh}");
            assert!(dh <= 400, "{w}x{h} -> {dw}x{dh}");
        }
    }

    #[test]
    fn display_size_preserves_aspect_within_floor_error() {
        let (dw, dh) = display_size(1920, 1080, 600, 400);
        let expected_height = f64::from(dw) * 1080.0 / 1920.0;
        assert!((f64::from(dh) - expected_height).abs() <= 1.0);
    }

    // -------------------------------------------------------------------------
    // translate tests
    // -------------------------------------------------------------------------

    #[test]
    fn translate_moves_within_bounds() {
        let moved = rect(100.0, 50.0, 200.0, 100.0).translated(20.0, -10.0, CANVAS);
        assert_eq!(moved.left, 120.0);
        assert_eq!(moved.top, 40.0);
    }

    #[test]
    fn translate_clamps_to_canvas_edges() {
        let moved = rect(100.0, 50.0, 200.0, 100.0).translated(1000.0, -1000.0, CANVAS);
        assert_eq!(moved.left, 400.0); // 600 - 200
        assert_eq!(moved.top, 0.0);
    }

    #[test]
    fn random_drag_sequences_stay_in_bounds() {
        // Simple deterministic LCG so the sequence is reproducible
        let mut seed: u64 = 0x2545_F491;
        let mut next = || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((seed >> 33) as i32 % 400) as f32
        };

        let mut r = rect(200.0, 100.0, 150.0, 80.0);
        for _ in 0..200 {
            r = r.translated(next(), next(), CANVAS);
            assert!(r.within(CANVAS), "escaped bounds: {r:?}");
        }
    }

    // -------------------------------------------------------------------------
    // resize tests
    // -------------------------------------------------------------------------

    #[test]
    fn bottom_right_resize_keeps_origin_fixed() {
        let resized =
            rect(100.0, 50.0, 200.0, 100.0).resized(HandlePosition::BottomRight, 40.0, 30.0, CANVAS, MIN_DIM, None);
        assert_eq!(resized.left, 100.0);
        assert_eq!(resized.top, 50.0);
        assert_eq!(resized.width, 240.0);
        assert_eq!(resized.height, 130.0);
    }

    #[test]
    fn top_left_resize_keeps_opposite_corner_fixed() {
        let start = rect(100.0, 50.0, 200.0, 100.0);
        let resized = start.resized(HandlePosition::TopLeft, 20.0, 10.0, CANVAS, MIN_DIM, None);
        assert_eq!(resized.left + resized.width, start.left + start.width);
        assert_eq!(resized.top + resized.height, start.top + start.height);
    }

    #[test]
    fn resize_enforces_minimum_dimensions() {
        let resized =
            rect(100.0, 50.0, 80.0, 60.0).resized(HandlePosition::BottomRight, -500.0, -500.0, CANVAS, MIN_DIM, None);
        assert!(resized.width >= MIN_DIM);
        assert!(resized.height >= MIN_DIM);
    }

    #[test]
    fn resize_with_ratio_holds_four_by_three() {
        let ratio = 4.0 / 3.0;
        let mut r = rect(50.0, 50.0, 160.0, 120.0);

        let mut seed: u64 = 0x9E37_79B9;
        let mut next = || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((seed >> 33) as i32 % 120) as f32
        };
        let handles = [
            HandlePosition::TopLeft,
            HandlePosition::TopRight,
            HandlePosition::BottomLeft,
            HandlePosition::BottomRight,
        ];

        for i in 0..100 {
            r = r.resized(handles[i % 4], next(), next(), CANVAS, MIN_DIM, Some(ratio));
            assert!(r.within(CANVAS), "escaped bounds: {r:?}");
            assert!(
                (r.width / r.height - ratio).abs() < 1e-3,
                "ratio broken: {r:?}"
            );
        }
    }

    #[test]
    fn resize_clamps_into_canvas() {
        let resized =
            rect(500.0, 200.0, 90.0, 90.0).resized(HandlePosition::BottomRight, 500.0, 500.0, CANVAS, MIN_DIM, None);
        assert!(resized.within(CANVAS));
    }

    // -------------------------------------------------------------------------
    // ratio constraint tests
    // -------------------------------------------------------------------------

    #[test]
    fn constrain_shrinks_wide_rectangle_to_square() {
        let constrained = rect(10.0, 10.0, 200.0, 100.0).constrained_to_ratio(1.0, CANVAS);
        assert_eq!(constrained.width, 100.0);
        assert_eq!(constrained.height, 100.0);
    }

    #[test]
    fn constrain_shrinks_tall_rectangle_to_square() {
        let constrained = rect(10.0, 10.0, 100.0, 200.0).constrained_to_ratio(1.0, CANVAS);
        assert_eq!(constrained.width, 100.0);
        assert_eq!(constrained.height, 100.0);
    }

    #[test]
    fn constrain_respects_canvas_bounds() {
        // Near the bottom edge: the re-derived height would overflow
        let constrained = rect(0.0, 250.0, 200.0, 40.0).constrained_to_ratio(1.0, CANVAS);
        assert!(constrained.within(CANVAS));
        assert!((constrained.width - constrained.height).abs() < f32::EPSILON);
    }

    // -------------------------------------------------------------------------
    // source mapping tests
    // -------------------------------------------------------------------------

    #[test]
    fn to_source_scales_per_axis() {
        // Canvas 600x300 for a 1200x900 source: scale 2.0 horizontal, 3.0 vertical
        let source = rect(30.0, 20.0, 100.0, 50.0).to_source(CANVAS, 1200, 900);
        assert_eq!(
            source,
            SourceRect {
                x: 60,
                y: 60,
                width: 200,
                height: 150
            }
        );
    }

    #[test]
    fn to_source_rounds_fractional_pixels() {
        let source = rect(0.0, 0.0, 100.5, 50.4).to_source(CANVAS, 600, 300);
        assert_eq!(source.width, 101); // 100.5 rounds away from zero
        assert_eq!(source.height, 50);
    }
}
