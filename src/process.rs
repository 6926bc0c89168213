//! File-level pipelines: decode inputs, run the pixel code, write results.
//!
//! Two pipelines share the same backend and event plumbing:
//!
//! - [`build_mosaic`]: every input becomes one cell of a single canvas. All
//!   or nothing: one unreadable file aborts the run, naming its position.
//! - [`box_images`]: every input is reconciled to the ratio on its own and
//!   written next to the others as `<prefix><file name>`. Batch semantics: a
//!   failing file is recorded in the report and the rest carry on.
//!
//! ## Output Structure
//!
//! ```text
//! mosaic.png                     # build_mosaic
//! output/                        # box_images
//! ├── processed_beach.jpg
//! └── processed_harbour.png
//! ```
//!
//! ## Parallel Processing
//!
//! Decoding and per-file work run on the rayon pool. Progress is reported as
//! [`ProcessEvent`]s over an optional channel so the caller decides how (and
//! whether) to display it.

use crate::config::{BoxerConfig, ConfigError};
use crate::imaging::{
    BackendError, Dimensions, FitMode, ImageBackend, MosaicError, MosaicParams, MosaicPlan,
    Quality, ReconcileError, RustBackend, compose_mosaic_with, plan_mosaic, reconcile_cell,
};
use crate::naming::boxed_output_path;
use crate::ratio::AspectRatio;
use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load image #{} ({}): {source}", .index + 1, .path.display())]
    Load {
        index: usize,
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("image #{} ({}) could not be boxed: {source}", .index + 1, .path.display())]
    Reconcile {
        index: usize,
        path: PathBuf,
        #[source]
        source: ReconcileError,
    },
    #[error(transparent)]
    Mosaic(#[from] MosaicError),
    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("output {} would overwrite another boxed image", .path.display())]
    OutputCollision { path: PathBuf },
}

/// Progress events emitted while a pipeline runs.
///
/// `index` is always the zero-based position in the input list. Events from
/// parallel work arrive in completion order, not input order.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    MosaicPlanned {
        plan: MosaicPlan,
    },
    ImageLoaded {
        index: usize,
        source: PathBuf,
        dimensions: Dimensions,
    },
    MosaicSaved {
        output: PathBuf,
        dimensions: Dimensions,
    },
    ImageBoxed {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        original: Dimensions,
        boxed: Dimensions,
    },
    ImageFailed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

// ============================================================================
// Options
// ============================================================================

/// Settings for [`build_mosaic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicOptions {
    pub params: MosaicParams,
    pub quality: Quality,
}

impl MosaicOptions {
    /// Build options from the configured values.
    pub fn from_config(config: &BoxerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            params: config.mosaic_params()?,
            quality: config.quality(),
        })
    }
}

/// Settings for [`box_images`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoxOptions {
    pub target_ratio: AspectRatio,
    pub fit: FitMode,
    pub quality: Quality,
    /// Output file-name prefix, e.g. `processed_`.
    pub prefix: String,
}

impl BoxOptions {
    /// Build options from the configured values.
    pub fn from_config(config: &BoxerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            target_ratio: config.target_ratio()?,
            fit: config.fit(),
            quality: config.quality(),
            prefix: config.output.prefix.clone(),
        })
    }
}

// ============================================================================
// Reports
// ============================================================================

/// One decoded input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedInput {
    pub source: PathBuf,
    pub dimensions: Dimensions,
}

/// Result of a successful [`build_mosaic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicReport {
    pub output: PathBuf,
    pub plan: MosaicPlan,
    /// Inputs in cell order.
    pub inputs: Vec<LoadedInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxedImage {
    pub index: usize,
    pub source: PathBuf,
    pub output: PathBuf,
    pub original: Dimensions,
    pub boxed: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedImage {
    pub index: usize,
    pub source: PathBuf,
    pub error: String,
}

/// Result of [`box_images`]. Both lists are in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxReport {
    pub output_dir: PathBuf,
    pub boxed: Vec<BoxedImage>,
    pub failed: Vec<FailedImage>,
}

impl BoxReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// Mosaic pipeline
// ============================================================================

/// Compose `inputs` into one mosaic at `output` with the `image`-crate backend.
pub fn build_mosaic(
    inputs: &[PathBuf],
    output: &Path,
    options: &MosaicOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<MosaicReport, ProcessError> {
    build_mosaic_with_backend(&RustBackend::new(), inputs, output, options, events)
}

/// Compose using a specific backend (allows testing with mock).
pub fn build_mosaic_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output: &Path,
    options: &MosaicOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<MosaicReport, ProcessError> {
    // Geometry and output format first: neither needs a decode to fail
    let plan = plan_mosaic(inputs.len(), &options.params)?;
    backend
        .output_format(output)
        .map_err(|source| ProcessError::Save {
            path: output.to_path_buf(),
            source,
        })?;
    emit(&events, ProcessEvent::MosaicPlanned { plan });

    let decoded: Vec<Result<RgbImage, BackendError>> =
        inputs.par_iter().map(|path| backend.load(path)).collect();

    let mut images = Vec::with_capacity(inputs.len());
    let mut loaded = Vec::with_capacity(inputs.len());
    for (index, (path, result)) in inputs.iter().zip(decoded).enumerate() {
        let image = result.map_err(|source| ProcessError::Load {
            index,
            path: path.clone(),
            source,
        })?;
        let dimensions = Dimensions::of(&image);
        emit(
            &events,
            ProcessEvent::ImageLoaded {
                index,
                source: path.clone(),
                dimensions,
            },
        );
        loaded.push(LoadedInput {
            source: path.clone(),
            dimensions,
        });
        images.push(image);
    }

    let canvas = compose_mosaic_with(&images, &options.params)?;
    drop(images);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    backend
        .save(&canvas, output, options.quality)
        .map_err(|source| ProcessError::Save {
            path: output.to_path_buf(),
            source,
        })?;
    emit(
        &events,
        ProcessEvent::MosaicSaved {
            output: output.to_path_buf(),
            dimensions: Dimensions::of(&canvas),
        },
    );

    Ok(MosaicReport {
        output: output.to_path_buf(),
        plan,
        inputs: loaded,
    })
}

// ============================================================================
// Batch boxing pipeline
// ============================================================================

/// Reconcile every input to the target ratio and save it into `output_dir`,
/// with the `image`-crate backend.
pub fn box_images(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &BoxOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BoxReport, ProcessError> {
    box_images_with_backend(&RustBackend::new(), inputs, output_dir, options, events)
}

/// Box using a specific backend (allows testing with mock).
///
/// Only creating `output_dir` can fail the whole call; per-file problems end
/// up in [`BoxReport::failed`].
pub fn box_images_with_backend(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &BoxOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BoxReport, ProcessError> {
    std::fs::create_dir_all(output_dir)?;

    // Resolve output names up front so two inputs with the same file name
    // never race for one output file.
    let mut claimed = HashSet::new();
    let jobs: Vec<(usize, &PathBuf, Result<PathBuf, ProcessError>)> = inputs
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let output = boxed_output_path(output_dir, &options.prefix, source);
            let target = if claimed.insert(output.clone()) {
                Ok(output)
            } else {
                Err(ProcessError::OutputCollision { path: output })
            };
            (index, source, target)
        })
        .collect();

    let results: Vec<Result<BoxedImage, FailedImage>> = jobs
        .into_par_iter()
        .map(|(index, source, target)| {
            let result =
                target.and_then(|output| box_one(backend, index, source, &output, options));
            match result {
                Ok(boxed) => {
                    emit(
                        &events,
                        ProcessEvent::ImageBoxed {
                            index,
                            source: boxed.source.clone(),
                            output: boxed.output.clone(),
                            original: boxed.original,
                            boxed: boxed.boxed,
                        },
                    );
                    Ok(boxed)
                }
                Err(e) => {
                    let failed = FailedImage {
                        index,
                        source: source.clone(),
                        error: e.to_string(),
                    };
                    emit(
                        &events,
                        ProcessEvent::ImageFailed {
                            index,
                            source: failed.source.clone(),
                            error: failed.error.clone(),
                        },
                    );
                    Err(failed)
                }
            }
        })
        .collect();

    let mut report = BoxReport {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(boxed) => report.boxed.push(boxed),
            Err(failed) => report.failed.push(failed),
        }
    }
    Ok(report)
}

fn box_one(
    backend: &impl ImageBackend,
    index: usize,
    source: &Path,
    output: &Path,
    options: &BoxOptions,
) -> Result<BoxedImage, ProcessError> {
    backend
        .output_format(output)
        .map_err(|e| ProcessError::Save {
            path: output.to_path_buf(),
            source: e,
        })?;
    let image = backend.load(source).map_err(|e| ProcessError::Load {
        index,
        path: source.to_path_buf(),
        source: e,
    })?;
    let boxed = reconcile_cell(&image, options.target_ratio, options.fit).map_err(|e| {
        ProcessError::Reconcile {
            index,
            path: source.to_path_buf(),
            source: e,
        }
    })?;
    backend
        .save(&boxed, output, options.quality)
        .map_err(|e| ProcessError::Save {
            path: output.to_path_buf(),
            source: e,
        })?;

    Ok(BoxedImage {
        index,
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        original: Dimensions::of(&image),
        boxed: Dimensions::of(&boxed),
    })
}

// ============================================================================
// Input check
// ============================================================================

/// Header-level probe of one input: dimensions, or why they can't be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedInput {
    pub source: PathBuf,
    pub dimensions: Result<Dimensions, String>,
}

/// Identify every input without decoding pixels or writing anything.
pub fn check_inputs(inputs: &[PathBuf]) -> Vec<CheckedInput> {
    check_inputs_with_backend(&RustBackend::new(), inputs)
}

pub fn check_inputs_with_backend(backend: &impl ImageBackend, inputs: &[PathBuf]) -> Vec<CheckedInput> {
    inputs
        .par_iter()
        .map(|source| CheckedInput {
            source: source.clone(),
            dimensions: backend.identify(source).map_err(|e| e.to_string()),
        })
        .collect()
}
