// SPDX-License-Identifier: MPL-2.0
//! Editing domain types.
//!
//! This module provides pure domain types for image editing operations:
//! - [`Quality`]: Compression quality for lossy export
//! - [`Stride`]: Grid step length for the smart-crop search

pub mod newtypes;

pub use newtypes::{Quality, Stride};
