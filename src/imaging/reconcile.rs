//! Bring one image to an exact aspect ratio by cropping or padding.
//!
//! Geometry comes from [`crop_region`] and [`pad_layout`]; this module only
//! moves pixels. The source image is borrowed and never modified, every result
//! is a fresh buffer.

use super::calculations::{MAX_CANVAS_PIXELS, canvas_size, crop_region, pad_layout};
use super::params::FitMode;
use crate::ratio::AspectRatio;
use image::{RgbImage, imageops};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error(
        "padded canvas {width}x{height} exceeds the {}-pixel limit",
        MAX_CANVAS_PIXELS
    )]
    TooLarge { width: u64, height: u64 },
}

/// Reshape `image` so that `width / height` equals `target`.
///
/// - [`FitMode::Crop`] keeps a centred slice, never growing either side.
/// - [`FitMode::Pad`] centres the image on a black canvas, never shrinking
///   either side and leaving every original pixel intact.
///
/// An image whose ratio compares exactly equal to `target` is returned as an
/// unchanged copy. Padding that would need a canvas beyond
/// [`MAX_CANVAS_PIXELS`] is [`ReconcileError::TooLarge`]; nothing is allocated.
pub fn reconcile_cell(
    image: &RgbImage,
    target: AspectRatio,
    fit: FitMode,
) -> Result<RgbImage, ReconcileError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ReconcileError::EmptyImage { width, height });
    }

    match fit {
        FitMode::Crop => Ok(crop_to_ratio(image, target.value())),
        FitMode::Pad => pad_to_ratio(image, target.value()),
    }
}

fn crop_to_ratio(image: &RgbImage, target: f64) -> RgbImage {
    match crop_region(image.dimensions(), target) {
        Some(r) => imageops::crop_imm(image, r.x, r.y, r.width, r.height).to_image(),
        None => image.clone(),
    }
}

fn pad_to_ratio(image: &RgbImage, target: f64) -> Result<RgbImage, ReconcileError> {
    let Some(p) = pad_layout(image.dimensions(), target) else {
        return Ok(image.clone());
    };
    let (width, height) =
        canvas_size(p.canvas_width, p.canvas_height).ok_or(ReconcileError::TooLarge {
            width: p.canvas_width,
            height: p.canvas_height,
        })?;

    // RgbImage::new is zero-filled, i.e. black
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, image, p.offset_x as i64, p.offset_y as i64);
    Ok(canvas)
}
