//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the only place where files turn into pixels
//! and back: identify, load (decode + RGB normalisation) and save. The
//! composition core never sees a path.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::Quality;
use image::{ImageFormat, RgbImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image I/O backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where the format allows it.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image and normalise it to 8-bit RGB.
    fn load(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Format `save` would write to `path`, or why it can't write there.
    /// Lets callers reject an output before doing any decoding.
    fn output_format(&self, path: &Path) -> Result<ImageFormat, BackendError>;

    /// Encode `image` to `path`, picking the format from the extension.
    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::test_helpers::gradient_image;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock backend that serves synthetic images and records operations.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub images: Mutex<HashMap<PathBuf, Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Load(String),
        Save {
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve a gradient image of the given size for each path.
        /// Paths not listed fail to load.
        pub fn with_images(images: &[(&str, u32, u32)]) -> Self {
            let map = images
                .iter()
                .map(|&(path, width, height)| (PathBuf::from(path), Dimensions { width, height }))
                .collect();
            Self {
                images: Mutex::new(map),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn saves(&self) -> Vec<RecordedOp> {
            self.get_operations()
                .into_iter()
                .filter(|op| matches!(op, RecordedOp::Save { .. }))
                .collect()
        }

        fn lookup(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.images
                .lock()
                .unwrap()
                .get(path)
                .copied()
                .ok_or_else(|| BackendError::Decode {
                    path: path.display().to_string(),
                    reason: "no mock image".to_string(),
                })
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));
            self.lookup(path)
        }

        fn load(&self, path: &Path) -> Result<RgbImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Load(path.to_string_lossy().to_string()));
            let dims = self.lookup(path)?;
            Ok(gradient_image(dims.width, dims.height))
        }

        fn output_format(&self, path: &Path) -> Result<ImageFormat, BackendError> {
            crate::imaging::rust_backend::output_format(path)
        }

        fn save(
            &self,
            image: &RgbImage,
            path: &Path,
            quality: Quality,
        ) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Save {
                output: path.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_images(&[("/test/image.jpg", 800, 600)]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_load_serves_requested_size() {
        let backend = MockBackend::with_images(&[("/a.png", 40, 30)]);
        let img = backend.load(Path::new("/a.png")).unwrap();
        assert_eq!(img.dimensions(), (40, 30));
        assert!(backend.load(Path::new("/missing.png")).is_err());
    }

    #[test]
    fn mock_records_save() {
        let backend = MockBackend::new();
        backend
            .save(
                &gradient_image(12, 8),
                Path::new("/out/mosaic.jpg"),
                Quality::new(80),
            )
            .unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Save {
                output: "/out/mosaic.jpg".to_string(),
                width: 12,
                height: 8,
                quality: 80,
            }]
        );
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(
            Dimensions {
                width: 640,
                height: 480
            }
            .to_string(),
            "640x480"
        );
    }
}
