//! # Image Boxer
//!
//! Fits images to an aspect ratio. Either many images are tiled into one
//! mosaic whose overall shape approximates the ratio, or each image is
//! cropped or padded to the ratio on its own.
//!
//! # Pipeline
//!
//! ```text
//! paths ──scan──▶ ordered inputs ──backend.load──▶ RGB buffers
//!       ──compose_mosaic──▶ one canvas   ──backend.save──▶ mosaic.png
//!       ──reconcile_cell──▶ one per file ──backend.save──▶ output/processed_*
//! ```
//!
//! The pixel code ([`imaging::compose`], [`imaging::reconcile`]) only sees
//! in-memory buffers; everything that touches the filesystem sits behind the
//! [`imaging::ImageBackend`] trait so pipelines can be tested with a mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ratio`] | `"W:H"` parsing into [`ratio::AspectRatio`], named presets |
//! | [`imaging`] | Grid math, crop/pad reconciliation, mosaic composition, image I/O |
//! | [`scan`] | Turns file and directory arguments into an ordered input list |
//! | [`naming`] | `NNN-name` ordering convention and output file names |
//! | [`process`] | File-level pipelines (`build_mosaic`, `box_images`, `check_inputs`) |
//! | [`config`] | `boxer.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Geometry
//!
//! For `n` images the grid has `cols = ceil(sqrt(n))` and
//! `rows = ceil(n / cols)`. Each cell gets the ratio `target × rows / cols`,
//! so `cols` cells side by side and `rows` cells stacked reproduce the target.
//! Cells are [`imaging::BASE_CELL_HEIGHT`] pixels tall unless configured
//! otherwise; the cell width is rounded, so the final canvas ratio is within
//! half a pixel per column of the target.
//!
//! Images that don't match their cell are either cropped (centred, lossy) or
//! padded with black (centred, lossless), then resampled with Lanczos3.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod ratio;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
