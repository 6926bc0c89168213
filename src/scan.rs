//! Input collection.
//!
//! Turns the paths a user typed (files and directories, in any mix) into the
//! ordered list of images that will be decoded. The order of that list is the
//! order of the mosaic cells.
//!
//! ## Rules
//!
//! - **Files** are taken as given, in argument order, if their extension has a
//!   decoder compiled in. Anything else is reported as skipped, not fatal.
//! - **Directories** contribute their image files, sorted by the `NNN-` prefix
//!   convention (see [`naming`](crate::naming)). Sub-directories are only
//!   entered when `recursive` is set; hidden entries are always ignored.
//! - **Duplicates** (the same path reached twice) are dropped, keeping the
//!   first occurrence.
//! - **Missing paths** are an error: a typo should not silently shrink the
//!   mosaic.

use crate::imaging::{is_supported_input, supported_input_extensions};
use crate::naming::compare_inputs;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("No supported images among the inputs (supported: {supported})")]
    NoImages { supported: String },
}

/// Why a path was left out of the input set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedExtension,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Ordered, de-duplicated image paths plus everything that was passed over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputSet {
    pub images: Vec<PathBuf>,
    pub skipped: Vec<SkippedInput>,
}

impl InputSet {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// The set itself, or [`ScanError::NoImages`] naming the extensions that
    /// would have been accepted.
    pub fn require_images(self) -> Result<Self, ScanError> {
        if self.is_empty() {
            return Err(ScanError::NoImages {
                supported: supported_input_extensions().join(", "),
            });
        }
        Ok(self)
    }
}

/// Collect image inputs from files and directories.
pub fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Result<InputSet, ScanError> {
    let mut set = InputSet::default();
    let mut seen = HashSet::new();

    for path in paths {
        if !path.exists() {
            return Err(ScanError::NotFound(path.clone()));
        }

        let candidates = if path.is_dir() {
            directory_images(path, recursive)?
        } else {
            vec![path.clone()]
        };

        for candidate in candidates {
            if !is_supported_input(&candidate) {
                set.skipped.push(SkippedInput {
                    path: candidate,
                    reason: SkipReason::UnsupportedExtension,
                });
                continue;
            }
            // Compare canonical paths so `./a.png` and `a.png` collapse
            let key = candidate
                .canonicalize()
                .unwrap_or_else(|_| candidate.clone());
            if seen.insert(key) {
                set.images.push(candidate);
            } else {
                set.skipped.push(SkippedInput {
                    path: candidate,
                    reason: SkipReason::Duplicate,
                });
            }
        }
    }

    Ok(set)
}

/// Image files inside `dir`, directory by directory, each sorted by
/// [`compare_inputs`]. Non-image files in directories are dropped silently.
fn directory_images(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by(|a, b| {
            // Files before sub-directories, then the naming convention
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            a_dir
                .cmp(&b_dir)
                .then_with(|| compare_inputs(a.path(), b.path()))
        })
        .into_iter()
        .filter_entry(|e| !is_hidden(e.path()));

    let mut images = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_png;
    use std::fs;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let tmp = TempDir::new().unwrap();
        let b = write_png(tmp.path(), "b.png", 4, 4);
        let a = write_png(tmp.path(), "a.png", 4, 4);

        let set = collect_inputs(&[b, a], false).unwrap();
        assert_eq!(names(&set.images), ["b.png", "a.png"]);
        assert!(set.skipped.is_empty());
    }

    #[test]
    fn directory_sorted_by_number_prefix() {
        let tmp = TempDir::new().unwrap();
        for name in ["zebra.png", "010-ten.png", "002-two.png", "alpha.png"] {
            write_png(tmp.path(), name, 4, 4);
        }

        let set = collect_inputs(&[tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(
            names(&set.images),
            ["002-two.png", "010-ten.png", "alpha.png", "zebra.png"]
        );
    }

    #[test]
    fn directory_ignores_hidden_and_non_images() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "shown.png", 4, 4);
        write_png(tmp.path(), ".hidden.png", 4, 4);
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

        let set = collect_inputs(&[tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(names(&set.images), ["shown.png"]);
        assert!(set.skipped.is_empty());
    }

    #[test]
    fn subdirectories_only_when_recursive() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "top.png", 4, 4);
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        write_png(&nested, "deep.png", 4, 4);

        let flat = collect_inputs(&[tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(names(&flat.images), ["top.png"]);

        let deep = collect_inputs(&[tmp.path().to_path_buf()], true).unwrap();
        assert_eq!(names(&deep.images), ["top.png", "deep.png"]);
    }

    #[test]
    fn explicit_unsupported_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("readme.md");
        fs::write(&doc, "# hi").unwrap();
        let img = write_png(tmp.path(), "img.png", 4, 4);

        let set = collect_inputs(&[doc.clone(), img], false).unwrap();
        assert_eq!(names(&set.images), ["img.png"]);
        assert_eq!(
            set.skipped,
            vec![SkippedInput {
                path: doc,
                reason: SkipReason::UnsupportedExtension
            }]
        );
    }

    #[test]
    fn duplicates_removed_preserving_first() {
        let tmp = TempDir::new().unwrap();
        let a = write_png(tmp.path(), "a.png", 4, 4);
        let b = write_png(tmp.path(), "b.png", 4, 4);

        let set = collect_inputs(&[a.clone(), b, tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(names(&set.images), ["a.png", "b.png"]);
        assert_eq!(set.skipped.len(), 2);
        assert!(set.skipped.iter().all(|s| s.reason == SkipReason::Duplicate));
        assert_eq!(set.skipped[0].path, a);
    }

    #[test]
    fn missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.png");
        let result = collect_inputs(&[missing.clone()], false);
        assert!(matches!(result, Err(ScanError::NotFound(p)) if p == missing));
    }

    #[test]
    fn empty_directory_gives_empty_set() {
        let tmp = TempDir::new().unwrap();
        let set = collect_inputs(&[tmp.path().to_path_buf()], false).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn require_images_lists_supported_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

        let set = collect_inputs(&[tmp.path().to_path_buf()], false).unwrap();
        let err = set.require_images().unwrap_err();
        assert!(matches!(&err, ScanError::NoImages { supported } if supported.contains("png")));
        assert!(err.to_string().contains("jpg"));
    }

    #[test]
    fn require_images_passes_non_empty_set() {
        let tmp = TempDir::new().unwrap();
        let a = write_png(tmp.path(), "a.png", 4, 4);
        let set = collect_inputs(&[a], false).unwrap().require_images().unwrap();
        assert_eq!(set.len(), 1);
    }
}
