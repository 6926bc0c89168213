//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Every image is shown by its position in the input list and its file name;
//! the full path and results (dimensions, output file, errors) follow as
//! indented context lines. Positions are 1-based and zero-padded, the same
//! numbers used in error messages (`image #2 ...`).
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Inputs (2 images)
//! 001 beach.jpg (1920x1080)
//!     Source: photos/beach.jpg
//! 002 broken.png
//!     Source: photos/broken.png
//!     Error: Failed to decode photos/broken.png: ...
//!
//! Skipped
//!     photos/notes.txt (unsupported format)
//! ```
//!
//! ## Mosaic
//!
//! ```text
//! Grid 2 rows x 3 cols, cells 356x300, canvas 1068x600
//!     001 beach.jpg (1920x1080)
//!     002 harbour.png (800x1200)
//! Saved mosaic.png (1068x600)
//! ```
//!
//! ## Box
//!
//! ```text
//!     001 beach.jpg 1920x1080 → 1920x1080
//!         Output: output/processed_beach.jpg
//!     002 broken.png failed
//!         Error: ...
//! Boxed 1 of 2 images → output/
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::MosaicPlan;
use crate::process::{BoxReport, CheckedInput, MosaicReport, ProcessEvent};
use crate::ratio::RatioPreset;
use crate::scan::{InputSet, SkipReason, SkippedInput};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based input index as a 3-digit zero-padded 1-based position.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Header line for one input: position + file name, with optional detail.
///
/// ```text
/// 001 beach.jpg (1920x1080)
/// 002 broken.png
/// ```
fn image_line(index: usize, source: &Path, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), file_name(source), d),
        None => format!("{} {}", format_index(index), file_name(source)),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Input collection / check
// ============================================================================

fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::UnsupportedExtension => "unsupported format",
        SkipReason::Duplicate => "duplicate",
    }
}

/// Lines describing inputs that were passed over. Empty when nothing was.
pub fn format_skipped(skipped: &[SkippedInput]) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Skipped".to_string()];
    for s in skipped {
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            s.path.display(),
            skip_reason(s.reason)
        ));
    }
    lines
}

/// One-line summary of a collected input set, used before processing starts.
pub fn format_input_summary(set: &InputSet) -> String {
    if set.skipped.is_empty() {
        format!("Collected {}", plural(set.len(), "image"))
    } else {
        format!(
            "Collected {} ({} skipped)",
            plural(set.len(), "image"),
            set.skipped.len()
        )
    }
}

/// Format `check` output: every input with its dimensions, then skips.
pub fn format_check_output(set: &InputSet, checked: &[CheckedInput]) -> Vec<String> {
    let mut lines = vec![format!("Inputs ({})", plural(checked.len(), "image"))];

    for (index, input) in checked.iter().enumerate() {
        match &input.dimensions {
            Ok(dims) => {
                lines.push(image_line(index, &input.source, Some(&dims.to_string())));
                lines.push(format!("{}Source: {}", indent(1), input.source.display()));
            }
            Err(error) => {
                lines.push(image_line(index, &input.source, None));
                lines.push(format!("{}Source: {}", indent(1), input.source.display()));
                lines.push(format!("{}Error: {}", indent(1), error));
            }
        }
    }

    let skipped = format_skipped(&set.skipped);
    if !skipped.is_empty() {
        lines.push(String::new());
        lines.extend(skipped);
    }
    lines
}

pub fn print_check_output(set: &InputSet, checked: &[CheckedInput]) {
    for line in format_check_output(set, checked) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan / presets
// ============================================================================

/// Format a mosaic plan with a cell diagram (`[###]` = image slot,
/// `[   ]` = black filler).
///
/// ```text
/// Grid: 2 rows x 3 cols (5 images, 1 empty)
/// Cell: 356x300 (ratio 1.1852)
/// Canvas: 1068x600 (ratio 1.7800, target 1.7778)
///
///     [001][002][003]
///     [004][005][   ]
/// ```
pub fn format_plan(plan: &MosaicPlan) -> Vec<String> {
    let layout = plan.layout;
    let mut lines = vec![
        format!(
            "Grid: {} rows x {} cols ({}, {} empty)",
            layout.rows,
            layout.cols,
            plural(plan.image_count, "image"),
            plan.empty_cells()
        ),
        format!(
            "Cell: {}x{} (ratio {})",
            plan.cell_width, plan.cell_height, plan.cell_ratio
        ),
        format!(
            "Canvas: {}x{} (ratio {:.4}, target {})",
            plan.canvas_width(),
            plan.canvas_height(),
            plan.canvas_ratio(),
            plan.target_ratio
        ),
        String::new(),
    ];

    for row in 0..layout.rows as usize {
        let cells: String = (0..layout.cols as usize)
            .map(|col| {
                let index = row * layout.cols as usize + col;
                if index < plan.image_count {
                    format!("[{}]", format_index(index))
                } else {
                    "[   ]".to_string()
                }
            })
            .collect();
        lines.push(format!("{}{}", indent(1), cells));
    }
    lines
}

pub fn print_plan(plan: &MosaicPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

/// Format the preset table, labels aligned.
pub fn format_presets(presets: &[RatioPreset]) -> Vec<String> {
    let width = presets.iter().map(|p| p.label.len()).max().unwrap_or(0);
    presets
        .iter()
        .map(|p| format!("{:<width$}  {:<5} ({})", p.label, p.text, p.ratio()))
        .collect()
}

pub fn print_presets(presets: &[RatioPreset]) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}

// ============================================================================
// Pipeline progress
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::MosaicPlanned { plan } => vec![format!(
            "Grid {} rows x {} cols, cells {}x{}, canvas {}x{}",
            plan.layout.rows,
            plan.layout.cols,
            plan.cell_width,
            plan.cell_height,
            plan.canvas_width(),
            plan.canvas_height()
        )],
        ProcessEvent::ImageLoaded {
            index,
            source,
            dimensions,
        } => vec![format!(
            "{}{}",
            indent(1),
            image_line(*index, source, Some(&dimensions.to_string()))
        )],
        ProcessEvent::MosaicSaved { output, dimensions } => {
            vec![format!("Saved {} ({})", output.display(), dimensions)]
        }
        ProcessEvent::ImageBoxed {
            index,
            source,
            output,
            original,
            boxed,
        } => vec![
            format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                image_line(*index, source, None),
                original,
                boxed
            ),
            format!("{}Output: {}", indent(2), output.display()),
        ],
        ProcessEvent::ImageFailed {
            index,
            source,
            error,
        } => vec![
            format!("{}{} failed", indent(1), image_line(*index, source, None)),
            format!("{}Error: {}", indent(2), error),
        ],
    }
}

// ============================================================================
// Final summaries
// ============================================================================

pub fn format_mosaic_report(report: &MosaicReport) -> Vec<String> {
    vec![format!(
        "Mosaic {} ({}x{}, {} in a {}x{} grid)",
        report.output.display(),
        report.plan.canvas_width(),
        report.plan.canvas_height(),
        plural(report.inputs.len(), "image"),
        report.plan.layout.rows,
        report.plan.layout.cols
    )]
}

pub fn print_mosaic_report(report: &MosaicReport) {
    for line in format_mosaic_report(report) {
        println!("{}", line);
    }
}

/// Summary line plus one line per failure, in input order.
pub fn format_box_report(report: &BoxReport) -> Vec<String> {
    let total = report.boxed.len() + report.failed.len();
    let mut lines = vec![format!(
        "Boxed {} of {} \u{2192} {}/",
        report.boxed.len(),
        plural(total, "image"),
        report.output_dir.display()
    )];
    if !report.failed.is_empty() {
        lines.push("Failed".to_string());
        for f in &report.failed {
            lines.push(format!("{}{}", indent(1), image_line(f.index, &f.source, None)));
            lines.push(format!("{}Error: {}", indent(2), f.error));
        }
    }
    lines
}

pub fn print_box_report(report: &BoxReport) {
    for line in format_box_report(report) {
        println!("{}", line);
    }
}
