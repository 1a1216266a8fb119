// SPDX-License-Identifier: MPL-2.0
//! `rastermill` is a headless image editing engine.
//!
//! It loads an image payload, presents it through a bounded preview
//! transform, applies resize, crop (manual or saliency-based), and
//! quality/format compression, with each edit committing into a bounded
//! undo/redo history, and exports the current state as an encoded
//! download payload. A small CLI binary drives the engine; any richer UI
//! is expected to be a thin adapter over [`engine::Editor`].

#![doc(html_root_url = "https://docs.rs/rastermill/0.2.0")]

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod media;
