//! Mosaic composition: many images, one canvas, one target ratio.
//!
//! ```text
//! images ──plan_grid──▶ rows × cols
//!        ──cell_ratio─▶ target × rows / cols
//!        ──per image──▶ reconcile → resize to cell → paste at (col·w, row·h)
//! ```
//!
//! ## Parallelism
//!
//! Reconciling and resizing one image never looks at another, so every cell is
//! rendered into its own buffer on the rayon pool. Pasting happens afterwards
//! on the calling thread, in input order, which keeps the canvas free of
//! shared writes. If several images fail, the error for the lowest index is
//! reported so results don't depend on scheduling.

use super::calculations::{
    GridLayout, MAX_CANVAS_PIXELS, canvas_size, cell_dimensions, cell_origin, cell_ratio,
    plan_grid,
};
use super::params::{FitMode, MosaicParams};
use super::reconcile::{ReconcileError, reconcile_cell};
use crate::ratio::{AspectRatio, RatioError};
use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MosaicError {
    #[error("no images provided")]
    EmptyInput,
    #[error("image #{} could not be placed: {source}", .index + 1)]
    Composition {
        /// Zero-based position in the input sequence.
        index: usize,
        #[source]
        source: ReconcileError,
    },
    #[error("cell size {width}x{height} is degenerate; choose a less extreme ratio or a larger cell height")]
    DegenerateCell { width: u64, height: u32 },
    #[error(
        "canvas {width}x{height} exceeds the {}-pixel limit; choose a less extreme ratio or a smaller cell height",
        MAX_CANVAS_PIXELS
    )]
    CanvasTooLarge { width: u64, height: u64 },
    #[error("{0} images can't fit a {max} pixel canvas even at one pixel each", max = MAX_CANVAS_PIXELS)]
    TooManyImages(usize),
    #[error(transparent)]
    Ratio(#[from] RatioError),
}

/// Geometry of a mosaic, computed before any pixel is touched.
///
/// Only [`plan_mosaic`] builds one, and it guarantees the canvas fits
/// [`MAX_CANVAS_PIXELS`], so the canvas accessors cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MosaicPlan {
    pub image_count: usize,
    pub layout: GridLayout,
    pub target_ratio: AspectRatio,
    pub cell_ratio: AspectRatio,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl MosaicPlan {
    pub fn canvas_width(&self) -> u32 {
        self.cell_width * self.layout.cols
    }

    pub fn canvas_height(&self) -> u32 {
        self.cell_height * self.layout.rows
    }

    /// Ratio the canvas actually ends up with after cell-size rounding.
    pub fn canvas_ratio(&self) -> f64 {
        self.canvas_width() as f64 / self.canvas_height() as f64
    }

    /// Cells left black because there are fewer images than slots.
    pub fn empty_cells(&self) -> usize {
        self.layout.capacity().saturating_sub(self.image_count)
    }
}

/// Work out grid, cell ratio and cell size for `count` images.
///
/// Zero images is an [`MosaicError::EmptyInput`]; the single-cell grid that
/// [`plan_grid`] returns for zero is never used. A canvas that would not fit
/// [`MAX_CANVAS_PIXELS`] is [`MosaicError::CanvasTooLarge`].
pub fn plan_mosaic(count: usize, params: &MosaicParams) -> Result<MosaicPlan, MosaicError> {
    if count == 0 {
        return Err(MosaicError::EmptyInput);
    }
    if count as u64 > MAX_CANVAS_PIXELS {
        return Err(MosaicError::TooManyImages(count));
    }

    let layout = plan_grid(count);
    let ratio = AspectRatio::new(cell_ratio(params.target_ratio.value(), layout))?;
    let (cell_width, cell_height) = cell_dimensions(ratio.value(), params.cell_height);
    if cell_width == 0 || cell_height == 0 {
        return Err(MosaicError::DegenerateCell {
            width: cell_width,
            height: cell_height,
        });
    }

    let width = cell_width.saturating_mul(layout.cols as u64);
    let height = cell_height as u64 * layout.rows as u64;
    let (canvas_width, _) =
        canvas_size(width, height).ok_or(MosaicError::CanvasTooLarge { width, height })?;
    let cell_width = canvas_width / layout.cols;

    Ok(MosaicPlan {
        image_count: count,
        layout,
        target_ratio: params.target_ratio,
        cell_ratio: ratio,
        cell_width,
        cell_height,
    })
}

/// Compose `images` into one canvas with the default cell height.
///
/// See [`compose_mosaic_with`].
pub fn compose_mosaic(
    images: &[RgbImage],
    target_ratio: AspectRatio,
    fit: FitMode,
) -> Result<RgbImage, MosaicError> {
    compose_mosaic_with(images, &MosaicParams::new(target_ratio, fit))
}

/// Compose `images` into one canvas whose ratio approximates
/// `params.target_ratio`.
///
/// Images are placed row-major in input order. Any image that can't be
/// reconciled aborts the whole composition; no partial mosaic is returned.
pub fn compose_mosaic_with(
    images: &[RgbImage],
    params: &MosaicParams,
) -> Result<RgbImage, MosaicError> {
    let plan = plan_mosaic(images.len(), params)?;
    let cell = (plan.cell_width, plan.cell_height);

    let rendered: Vec<Result<RgbImage, ReconcileError>> = images
        .par_iter()
        .map(|image| render_cell(image, &plan, params.fit))
        .collect();

    let mut canvas = RgbImage::new(plan.canvas_width(), plan.canvas_height());
    for (index, result) in rendered.into_iter().enumerate() {
        let tile = result.map_err(|source| MosaicError::Composition { index, source })?;
        let Some(position) = plan.layout.position(index) else {
            continue;
        };
        let (x, y) = cell_origin(position, cell);
        imageops::replace(&mut canvas, &tile, x as i64, y as i64);
    }

    Ok(canvas)
}

/// Reconcile one image to the cell ratio and scale it to the exact cell size.
fn render_cell(
    image: &RgbImage,
    plan: &MosaicPlan,
    fit: FitMode,
) -> Result<RgbImage, ReconcileError> {
    let reconciled = reconcile_cell(image, plan.cell_ratio, fit)?;
    Ok(imageops::resize(
        &reconciled,
        plan.cell_width,
        plan.cell_height,
        FilterType::Lanczos3,
    ))
}
