//! Pure Rust image I/O backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image::ImageReader` + `DynamicImage::into_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with [`Quality`] |
//! | Encode → PNG, TIFF, WebP, BMP, GIF | `ImageBuffer::save_with_format` (lossless) |
//!
//! Animated GIF/WebP inputs decode to their first frame.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions we offer, paired with the format that decodes them.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension we can decode (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Format an output path encodes to, from its extension. Only formats with an
/// encoder compiled in are accepted.
pub fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = lowercase_extension(path).unwrap_or_default();
    ImageFormat::from_extension(&ext)
        .filter(|f| f.writing_enabled())
        .ok_or(BackendError::UnsupportedFormat(ext))
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// `image`-crate backend.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Encode as JPEG at the requested quality.
fn save_jpeg(image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    JpegEncoder::new_with_quality(writer, quality.value() as u8)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<RgbImage, BackendError> {
        let decoded = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_error(path, e))?;
        Ok(decoded.into_rgb8())
    }

    fn output_format(&self, path: &Path) -> Result<ImageFormat, BackendError> {
        output_format(path)
    }

    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        let format = output_format(path)?;
        let ext = lowercase_extension(path).unwrap_or_default();

        match format {
            ImageFormat::Jpeg => save_jpeg(image, path, quality),
            other => image.save_with_format(path, other).map_err(|e| {
                BackendError::ProcessingFailed(format!("{} encode failed: {e}", ext.to_uppercase()))
            }),
        }
    }
}
