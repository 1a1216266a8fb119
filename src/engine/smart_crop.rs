// SPDX-License-Identifier: MPL-2.0
//! Content-aware crop selection.
//!
//! The selection is driven by a gradient-magnitude "importance" score:
//! a cheap saliency proxy, not object detection. A candidate window sized
//! from the active ratio slides across the full-resolution source on a
//! coarse grid, and the position with the highest summed importance wins.
//! The scan is fully deterministic: ties keep the first (top-left-most)
//! position found.

use crate::domain::editing::{Quality, Stride};
use crate::engine::geometry::SourceRect;
use crate::engine::pending::{CommitOutcome, SmartCropCompletion, SmartCropRequest};
use crate::engine::Editor;
use crate::error::Result;
use crate::media::{codec, transform, ExportFormat};
use image_rs::{DynamicImage, GenericImageView};

/// Per-pixel importance scores for the image, row-major.
///
/// Interior pixels score `sqrt(gx² + gy²)`, where `gx`/`gy` are the
/// absolute values of the summed R+G+B first differences along each axis.
/// Border pixels stay at 0.
#[must_use]
pub fn importance_map(image: &DynamicImage) -> Vec<f32> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let data = rgba.as_raw();
    let w = width as usize;
    let h = height as usize;

    let mut importance = vec![0.0f32; w * h];

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let idx = (y * w + x) * 4;
            let above = ((y - 1) * w + x) * 4;
            let below = ((y + 1) * w + x) * 4;

            let gx = (i32::from(data[idx + 4]) - i32::from(data[idx - 4])
                + i32::from(data[idx + 5])
                - i32::from(data[idx - 3])
                + i32::from(data[idx + 6])
                - i32::from(data[idx - 2]))
            .abs();

            let gy = (i32::from(data[below]) - i32::from(data[above])
                + i32::from(data[below + 1])
                - i32::from(data[above + 1])
                + i32::from(data[below + 2])
                - i32::from(data[above + 2]))
            .abs();

            #[allow(clippy::cast_precision_loss)]
            let magnitude = ((gx * gx + gy * gy) as f32).sqrt();
            importance[y * w + x] = magnitude;
        }
    }

    importance
}

/// Crop window dimensions for the given ratio: one source axis is filled
/// completely and the other is derived from the ratio, floored, always
/// within source bounds.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_dimensions(src_width: u32, src_height: u32, ratio: f32) -> (u32, u32) {
    let src_width = src_width.max(1);
    let src_height = src_height.max(1);
    if src_width as f32 / src_height as f32 > ratio {
        let height = src_height;
        let width = ((height as f32 * ratio).floor() as u32).clamp(1, src_width);
        (width, height)
    } else {
        let width = src_width;
        let height = ((width as f32 / ratio).floor() as u32).clamp(1, src_height);
        (width, height)
    }
}

/// Slide the crop window across the importance map and return the
/// top-left position with the maximum summed importance.
///
/// The window advances on the `window_step` grid and each candidate is
/// scored on the `sample_step` grid. Only strictly greater sums replace
/// the current best, so ties keep the first position found.
#[must_use]
pub fn find_best_window(
    importance: &[f32],
    width: u32,
    height: u32,
    crop_width: u32,
    crop_height: u32,
    window_step: Stride,
    sample_step: Stride,
) -> (u32, u32) {
    let w = width as usize;
    let h = height as usize;
    let cw = (crop_width as usize).min(w);
    let ch = (crop_height as usize).min(h);

    let mut best = (0u32, 0u32);
    let mut max_importance = 0.0f64;

    let mut y = 0usize;
    while y + ch <= h {
        let mut x = 0usize;
        while x + cw <= w {
            let mut total = 0.0f64;
            let mut dy = 0usize;
            while dy < ch {
                let row = (y + dy) * w;
                let mut dx = 0usize;
                while dx < cw {
                    total += f64::from(importance[row + x + dx]);
                    dx += sample_step.as_step();
                }
                dy += sample_step.as_step();
            }

            if total > max_importance {
                max_importance = total;
                #[allow(clippy::cast_possible_truncation)]
                {
                    best = (x as u32, y as u32);
                }
            }
            x += window_step.as_step();
        }
        y += window_step.as_step();
    }

    best
}

/// Full smart-crop selection: importance map, window dimensioning, and
/// the sliding-window search, combined into a source-space rectangle.
#[must_use]
pub fn best_window(
    image: &DynamicImage,
    ratio: f32,
    window_step: Stride,
    sample_step: Stride,
) -> SourceRect {
    let (width, height) = image.dimensions();
    let (crop_width, crop_height) = target_dimensions(width, height, ratio);
    let importance = importance_map(image);
    let (x, y) = find_best_window(
        &importance,
        width,
        height,
        crop_width,
        crop_height,
        window_step,
        sample_step,
    );
    SourceRect {
        x,
        y,
        width: crop_width,
        height: crop_height,
    }
}

impl Editor {
    /// Stage a smart crop over the full-resolution original image.
    ///
    /// Uses the persistent ratio selection (1:1 when free). Returns `None`
    /// without a loaded image. The returned request is safe to run on a
    /// worker thread; commit the completion with
    /// [`commit_smart_crop`](Editor::commit_smart_crop).
    pub fn begin_smart_crop(&mut self) -> Option<SmartCropRequest> {
        let image = self.original.clone()?;
        let ratio = self.crop_ratio.value().unwrap_or(1.0);
        let generation = self.generation.advance();
        self.status.start_processing();
        Some(SmartCropRequest {
            image,
            ratio,
            window_step: self.settings.smart_crop_window_step,
            sample_step: self.settings.smart_crop_sample_step,
            generation,
        })
    }

    /// Commit a finished smart crop.
    ///
    /// A completion whose generation has been superseded is discarded as
    /// [`CommitOutcome::Stale`] without touching the engine state.
    ///
    /// # Errors
    ///
    /// Propagates the request's encode failure; prior state is untouched.
    pub fn commit_smart_crop(&mut self, completion: SmartCropCompletion) -> Result<CommitOutcome> {
        if completion.generation != self.generation {
            return Ok(CommitOutcome::Stale);
        }
        self.status.finish_processing();
        let (image, encoded) = completion.result?;
        self.commit_processed(image, encoded);
        Ok(CommitOutcome::Committed)
    }
}

pub(crate) fn run_request(request: SmartCropRequest) -> SmartCropCompletion {
    let window = best_window(
        &request.image,
        request.ratio,
        request.window_step,
        request.sample_step,
    );
    let result = transform::crop(
        &request.image,
        window.x,
        window.y,
        window.width,
        window.height,
    )
    .ok_or_else(|| crate::error::Error::Decode("Smart crop produced an empty region".to_string()))
    .and_then(|cropped| {
        let encoded = codec::encode(&cropped, ExportFormat::Png, Quality::default())?;
        Ok((cropped, encoded))
    });

    SmartCropCompletion {
        generation: request.generation,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{ImageBuffer, Rgba};

    /// Flat left half, high-contrast striped right half.
    ///
    /// The stripes use a period of 4 so the central differences straddle
    /// a transition at every striped pixel.
    fn striped_right_image(width: u32, height: u32) -> DynamicImage {
        let buffer = ImageBuffer::from_fn(width, height, |x, _y| {
            if x >= width / 2 && x % 4 < 2 {
                Rgba([255u8, 255, 255, 255])
            } else {
                Rgba([0u8, 0, 0, 255])
            }
        });
        DynamicImage::ImageRgba8(buffer)
    }

    #[test]
    fn importance_is_zero_on_borders() {
        let img = striped_right_image(12, 8);
        let importance = importance_map(&img);
        for x in 0..12usize {
            assert_eq!(importance[x], 0.0); // top row
            assert_eq!(importance[7 * 12 + x], 0.0); // bottom row
        }
        for y in 0..8usize {
            assert_eq!(importance[y * 12], 0.0); // left column
            assert_eq!(importance[y * 12 + 11], 0.0); // right column
        }
    }

    #[test]
    fn importance_peaks_at_edges() {
        let img = striped_right_image(12, 8);
        let importance = importance_map(&img);
        // Flat region scores zero, striped region scores positive
        assert_eq!(importance[3 * 12 + 2], 0.0);
        assert!(importance[3 * 12 + 8] > 0.0);
    }

    #[test]
    fn target_dimensions_fill_one_axis() {
        // Wide source, square ratio: height fills, width derived
        assert_eq!(target_dimensions(1000, 500, 1.0), (500, 500));
        // Tall source, square ratio: width fills, height derived
        assert_eq!(target_dimensions(500, 1000, 1.0), (500, 500));
        // Matching ratio covers the whole source
        assert_eq!(target_dimensions(800, 600, 4.0 / 3.0), (800, 600));
    }

    #[test]
    fn target_dimensions_never_exceed_source() {
        for ratio in [0.25f32, 0.5, 1.0, 16.0 / 9.0, 4.0] {
            let (w, h) = target_dimensions(123, 77, ratio);
            assert!(w <= 123);
            assert!(h <= 77);
            assert!(w >= 1);
            assert!(h >= 1);
        }
    }

    #[test]
    fn best_window_prefers_high_contrast_region() {
        let img = striped_right_image(60, 40);
        let rect = best_window(&img, 1.0, Stride::new(10), Stride::new(1));
        // The 40x40 window can sit at x = 0, 10, or 20; the striped right
        // half pulls it as far right as the grid allows
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 40);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn best_window_is_deterministic() {
        let img = striped_right_image(64, 48);
        let first = best_window(&img, 4.0 / 3.0, Stride::new(10), Stride::new(5));
        let second = best_window(&img, 4.0 / 3.0, Stride::new(10), Stride::new(5));
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_image_keeps_top_left_window() {
        let buffer = ImageBuffer::from_pixel(50, 30, Rgba([128u8, 128, 128, 255]));
        let img = DynamicImage::ImageRgba8(buffer);
        let rect = best_window(&img, 1.0, Stride::new(10), Stride::new(5));
        assert_eq!((rect.x, rect.y), (0, 0));
    }
}
