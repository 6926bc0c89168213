//! File-name conventions for inputs and outputs.
//!
//! ## Input ordering
//!
//! Mosaic cells are filled in input order, so when a whole directory is given
//! its files need a predictable order. Files may carry an optional numeric
//! prefix (`NNN-`) to pin their position:
//! - `010-harbour.jpg` → sorts by 10
//! - `002.png` → sorts by 2
//! - `beach.jpg` → after every numbered file, by name
//!
//! ## Output names
//!
//! Individually boxed files keep their original file name behind a prefix
//! (`processed_` by default), so a batch run never overwrites its inputs.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Default file name for a composed mosaic.
pub const DEFAULT_MOSAIC_NAME: &str = "mosaic.png";

/// Result of parsing a numbered entry name like `010-harbour`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `10` from `010-harbour`)
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
}

/// Parse a file stem following the `NNN-name` convention.
///
/// - `"010-harbour"` → number=Some(10), name="harbour"
/// - `"002"` → number=Some(2), name=""
/// - `"beach-day"` → number=None, name="beach-day"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: rest.to_string(),
        };
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: stem.to_string(),
    }
}

/// Sort key for files inside one directory: numbered first, by number, then
/// everything by file name.
pub fn input_sort_key(path: &Path) -> (u32, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let number = parse_entry_name(&stem).number.unwrap_or(u32::MAX);
    (number, file_name)
}

/// Compare two input paths by [`input_sort_key`].
pub fn compare_inputs(a: &Path, b: &Path) -> Ordering {
    input_sort_key(a).cmp(&input_sort_key(b))
}

/// Output file name for a boxed copy of `source`: `<prefix><file name>`.
pub fn boxed_file_name(prefix: &str, source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    format!("{prefix}{name}")
}

/// Full output path for a boxed copy of `source` inside `output_dir`.
pub fn boxed_output_path(output_dir: &Path, prefix: &str, source: &Path) -> PathBuf {
    output_dir.join(boxed_file_name(prefix, source))
}
