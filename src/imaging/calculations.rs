//! Pure calculation functions for mosaic geometry.
//!
//! All functions here are pure and testable without any I/O or pixels. The
//! reconciler and the composer only ever move pixels to where these functions
//! say they go.

use serde::Serialize;

/// Largest canvas, in pixels, that any operation will allocate.
///
/// 2^28 pixels is 768 MiB of RGB8. Extreme ratios that pass validation can
/// still ask for far more than that, so every canvas size goes through
/// [`canvas_size`] first.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// `(width, height)` as allocatable `u32` sides, or `None` when either side is
/// zero or the area exceeds [`MAX_CANVAS_PIXELS`].
pub fn canvas_size(width: u64, height: u64) -> Option<(u32, u32)> {
    if width == 0 || height == 0 || width.saturating_mul(height) > MAX_CANVAS_PIXELS {
        return None;
    }
    Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
}

/// Rows × columns arrangement for a mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
}

impl GridLayout {
    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Row-major `(row, col)` slot for the image at `index`, or `None` if the
    /// grid has no slot for it.
    pub fn position(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.capacity() {
            return None;
        }
        let cols = self.cols as usize;
        Some(((index / cols) as u32, (index % cols) as u32))
    }
}

/// Choose a near-square grid for `count` images.
///
/// `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`. When `n` is not a perfect
/// square this leans towards more columns than rows. Zero and one image both
/// get a single cell.
///
/// # Examples
/// ```
/// # use image_boxer::imaging::{GridLayout, plan_grid};
/// assert_eq!(plan_grid(5), GridLayout { rows: 2, cols: 3 });
/// assert_eq!(plan_grid(10), GridLayout { rows: 3, cols: 4 });
/// ```
pub fn plan_grid(count: usize) -> GridLayout {
    if count <= 1 {
        return GridLayout { rows: 1, cols: 1 };
    }

    // Integer ceil(sqrt(n)): float sqrt can land a hair under an exact root.
    let mut cols = (count as f64).sqrt() as usize;
    while cols * cols < count {
        cols += 1;
    }
    let rows = count.div_ceil(cols);

    GridLayout {
        rows: rows as u32,
        cols: cols as u32,
    }
}

/// Width/height ratio each cell must have for the whole canvas to come out at
/// `target`.
///
/// The canvas is `cols` cells wide and `rows` cells tall, so
/// `(cols × w) / (rows × h) = target` gives `w / h = target × rows / cols`.
pub fn cell_ratio(target: f64, layout: GridLayout) -> f64 {
    target * layout.rows as f64 / layout.cols as f64
}

/// Pixel size of one cell: fixed height, width rounded from the ratio.
///
/// The width is `u64` and saturates rather than wrapping; callers bound it
/// with [`canvas_size`].
pub fn cell_dimensions(cell_ratio: f64, cell_height: u32) -> (u64, u32) {
    let width = (cell_height as f64 * cell_ratio).round() as u64;
    (width, cell_height)
}

/// Pixel offset of the cell at `(row, col)`.
pub fn cell_origin(position: (u32, u32), cell: (u32, u32)) -> (u32, u32) {
    let (row, col) = position;
    let (cell_w, cell_h) = cell;
    (col * cell_w, row * cell_h)
}

/// A rectangle inside a source image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Centred region of `source` whose ratio is `target`.
///
/// Returns `None` when the source ratio already equals `target`. The
/// comparison is exact: ratios that differ only by float noise still produce a
/// region, usually the full image or one pixel short of it.
///
/// # Arguments
/// * `source` - Image dimensions (width, height), both non-zero
/// * `target` - Desired width / height
pub fn crop_region(source: (u32, u32), target: f64) -> Option<Region> {
    let (width, height) = source;
    let current = width as f64 / height as f64;

    if current > target {
        // Too wide: keep full height, trim left and right
        let new_width = ((height as f64 * target).floor() as u32).clamp(1, width);
        Some(Region {
            x: (width - new_width) / 2,
            y: 0,
            width: new_width,
            height,
        })
    } else if current < target {
        // Too tall: keep full width, trim top and bottom
        let new_height = ((width as f64 / target).floor() as u32).clamp(1, height);
        Some(Region {
            x: 0,
            y: (height - new_height) / 2,
            width,
            height: new_height,
        })
    } else {
        None
    }
}

/// Where a padded image lands on its enlarged black canvas.
///
/// Sizes are `u64` because a tiny or huge target can push the grown side past
/// `u32::MAX`; [`canvas_size`] decides whether it can be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadLayout {
    pub canvas_width: u64,
    pub canvas_height: u64,
    pub offset_x: u64,
    pub offset_y: u64,
}

/// Canvas with ratio `target` that fully contains `source`, centred.
///
/// Returns `None` when the source ratio already equals `target` (exact
/// comparison, see [`crop_region`]).
pub fn pad_layout(source: (u32, u32), target: f64) -> Option<PadLayout> {
    let (width, height) = (source.0 as u64, source.1 as u64);
    let current = width as f64 / height as f64;

    if current > target {
        // Too wide: grow the canvas vertically
        let canvas_height = ((width as f64 / target).floor() as u64).max(height);
        Some(PadLayout {
            canvas_width: width,
            canvas_height,
            offset_x: 0,
            offset_y: (canvas_height - height) / 2,
        })
    } else if current < target {
        // Too tall: grow the canvas horizontally
        let canvas_width = ((height as f64 * target).floor() as u64).max(width);
        Some(PadLayout {
            canvas_width,
            canvas_height: height,
            offset_x: (canvas_width - width) / 2,
            offset_y: 0,
        })
    } else {
        None
    }
}
