// SPDX-License-Identifier: MPL-2.0
//! Generation-guarded staged operations.
//!
//! Decode and encode work runs as an asynchronous completion: the engine
//! hands out a request tagged with the generation current at issue time,
//! the caller runs it (typically on a worker thread), and the completion
//! is handed back for committing. Any state commit advances the
//! generation, so a completion that raced a newer edit no longer matches
//! and is discarded instead of overwriting newer state. There is no
//! cancellation primitive; a superseded request simply completes into a
//! stale commit.

use crate::domain::editing::{Quality, Stride};
use crate::engine::smart_crop;
use crate::error::Result;
use crate::media::{codec, transform, ExportFormat};
use image_rs::DynamicImage;
use std::sync::Arc;

/// Monotonic counter identifying the engine state a request was issued
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl Generation {
    /// Advance the counter and return the new value.
    pub(crate) fn advance(&mut self) -> Generation {
        self.0 += 1;
        *self
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Whether a completion was applied or discarded as superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Stale,
}

// =============================================================================
// Load
// =============================================================================

/// Staged decode of an incoming payload (validation already passed).
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub(crate) bytes: Vec<u8>,
    pub(crate) generation: Generation,
}

impl LoadRequest {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Run the decode. Safe to call on a worker thread.
    #[must_use]
    pub fn run(self) -> LoadCompletion {
        let result = codec::decode(&self.bytes);
        LoadCompletion {
            generation: self.generation,
            bytes: self.bytes,
            result,
        }
    }
}

/// Finished decode, ready to commit.
#[derive(Debug)]
pub struct LoadCompletion {
    pub(crate) generation: Generation,
    pub(crate) bytes: Vec<u8>,
    pub(crate) result: Result<DynamicImage>,
}

// =============================================================================
// Process
// =============================================================================

/// Staged resize-encode-decode round trip (the "Apply" action).
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub(crate) image: Arc<DynamicImage>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) quality: Quality,
    pub(crate) format: ExportFormat,
    pub(crate) generation: Generation,
}

impl ProcessRequest {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Resolved target dimensions for this request.
    #[must_use]
    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Run the resize and codec round trip. Safe to call on a worker
    /// thread.
    #[must_use]
    pub fn run(self) -> ProcessCompletion {
        let result = (|| {
            let resized = transform::resize(&self.image, self.width, self.height);
            let encoded = codec::encode(&resized, self.format, self.quality)?;
            let decoded = codec::decode(&encoded)?;
            Ok((decoded, encoded))
        })();

        ProcessCompletion {
            generation: self.generation,
            result,
        }
    }
}

/// Finished process step, ready to commit.
#[derive(Debug)]
pub struct ProcessCompletion {
    pub(crate) generation: Generation,
    pub(crate) result: Result<(DynamicImage, Vec<u8>)>,
}

// =============================================================================
// Smart crop
// =============================================================================

/// Staged saliency search over the full-resolution original.
#[derive(Debug, Clone)]
pub struct SmartCropRequest {
    pub(crate) image: Arc<DynamicImage>,
    pub(crate) ratio: f32,
    pub(crate) window_step: Stride,
    pub(crate) sample_step: Stride,
    pub(crate) generation: Generation,
}

impl SmartCropRequest {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Run the importance scan, window search, extraction, and snapshot
    /// encode. Safe to call on a worker thread.
    #[must_use]
    pub fn run(self) -> SmartCropCompletion {
        smart_crop::run_request(self)
    }
}

/// Finished smart crop, ready to commit.
#[derive(Debug)]
pub struct SmartCropCompletion {
    pub(crate) generation: Generation,
    pub(crate) result: Result<(DynamicImage, Vec<u8>)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::GenericImageView;

    #[test]
    fn generation_advances_monotonically() {
        let mut generation = Generation::default();
        let first = generation.advance();
        let second = generation.advance();
        assert!(second > first);
        assert_eq!(generation, second);
    }

    #[test]
    fn load_request_decodes_valid_payload() {
        let img = DynamicImage::new_rgba8(4, 4);
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image_rs::ImageFormat::Png,
        )
        .expect("encode fixture");

        let request = LoadRequest {
            bytes,
            generation: Generation::default(),
        };
        let completion = request.run();
        assert!(completion.result.is_ok());
    }

    #[test]
    fn load_request_reports_decode_failure() {
        let request = LoadRequest {
            bytes: b"not an image".to_vec(),
            generation: Generation::default(),
        };
        let completion = request.run();
        assert!(completion.result.is_err());
    }

    #[test]
    fn process_request_resizes_and_round_trips() {
        let image = Arc::new(DynamicImage::new_rgba8(10, 8));
        let request = ProcessRequest {
            image,
            width: 5,
            height: 4,
            quality: Quality::default(),
            format: ExportFormat::Png,
            generation: Generation::default(),
        };
        let completion = request.run();
        let (decoded, encoded) = completion.result.expect("process should succeed");
        assert_eq!(decoded.width(), 5);
        assert_eq!(decoded.height(), 4);
        assert!(!encoded.is_empty());
    }
}
