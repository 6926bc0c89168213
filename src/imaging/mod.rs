//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Grid planning** | [`plan_grid`] (pure math) |
//! | **Crop / pad to ratio** | `imageops::crop_imm` / `imageops::replace` on a black canvas |
//! | **Cell resize** | `imageops::resize` with `Lanczos3` |
//! | **Mosaic assembly** | rayon per-cell rendering + sequential paste |
//! | **Decode / encode** | [`RustBackend`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid and ratio math (unit testable)
//! - **Parameters**: Data structures describing a composition
//! - **Reconcile**: One image to one exact ratio (crop or pad)
//! - **Compose**: Many images to one mosaic
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] for file I/O

pub mod backend;
mod calculations;
pub mod compose;
mod params;
pub mod reconcile;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    GridLayout, MAX_CANVAS_PIXELS, PadLayout, Region, cell_ratio, crop_region, pad_layout,
    plan_grid,
};
pub use compose::{MosaicError, MosaicPlan, compose_mosaic, compose_mosaic_with, plan_mosaic};
pub use params::{BASE_CELL_HEIGHT, FitMode, MosaicParams, Quality};
pub use reconcile::{ReconcileError, reconcile_cell};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
