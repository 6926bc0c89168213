//! Shared test utilities for the image-boxer test suite.
//!
//! Provides synthetic image builders, on-disk fixture writers, and ratio
//! assertions that work with in-memory `RgbImage` buffers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "001-first.png", 64, 48);
//!
//! let img = gradient_image(64, 48);
//! assert_ratio_close(&img, 4.0 / 3.0);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// In-memory images
// =========================================================================

/// Image whose pixels encode their own coordinates, so crops and offsets are
/// visible in assertions: `R = x mod 256`, `G = y mod 256`, `B = 128`.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Single-colour image.
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

// =========================================================================
// Ratio assertions
// =========================================================================

/// Assert that `image` has aspect ratio `target` within one pixel of floor
/// rounding on its shorter side. Panics with the actual size on mismatch.
pub fn assert_ratio_close(image: &RgbImage, target: f64) {
    let (w, h) = image.dimensions();
    assert!(w > 0 && h > 0, "image is empty: {w}x{h}");
    let actual = w as f64 / h as f64;
    let tolerance = target.max(1.0) / w.min(h) as f64;
    assert!(
        (actual - target).abs() <= tolerance,
        "{w}x{h} has ratio {actual:.5}, expected {target:.5} (±{tolerance:.5})"
    );
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write `gradient_image(width, height)` as a lossless PNG and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient_image(width, height)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

/// Write `gradient_image(width, height)` as a JPEG and return its path.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = gradient_image(width, height);
    let file = std::fs::File::create(&path).unwrap();
    JpegEncoder::new_with_quality(std::io::BufWriter::new(file), 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    path
}
