//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between callers (the CLI, the file pipelines in
//! [`process`](crate::process)) and the pixel code in
//! [`reconcile`](super::reconcile) and [`compose`](super::compose).
//!
//! ## Types
//!
//! - [`FitMode`]: Crop or pad when an image's ratio doesn't match its cell.
//! - [`Quality`]: Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`MosaicParams`]: Target ratio, fit mode and base cell height for one composition.

use crate::ratio::AspectRatio;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel height of every mosaic cell unless configured otherwise.
pub const BASE_CELL_HEIGHT: u32 = 300;

/// How an image is reconciled with a ratio it doesn't have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Remove centred edge content. Lossy.
    Crop,
    /// Add centred black borders. Lossless.
    #[default]
    Pad,
}

impl FitMode {
    /// `true` selects cropping, `false` padding.
    pub fn from_crop_flag(crop: bool) -> Self {
        if crop { Self::Crop } else { Self::Pad }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop => f.write_str("crop"),
            Self::Pad => f.write_str("pad"),
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Everything the composer needs besides the images themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicParams {
    pub target_ratio: AspectRatio,
    pub fit: FitMode,
    /// Height of one cell in pixels; cell width follows from the ratio.
    pub cell_height: u32,
}

impl MosaicParams {
    pub fn new(target_ratio: AspectRatio, fit: FitMode) -> Self {
        Self {
            target_ratio,
            fit,
            cell_height: BASE_CELL_HEIGHT,
        }
    }

    pub fn with_cell_height(mut self, cell_height: u32) -> Self {
        self.cell_height = cell_height;
        self
    }
}
