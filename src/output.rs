//! Console output formatting for every command.
//!
//! # Output Format
//!
//! ## Thumbs
//!
//! ```text
//! Processing 3 images -> optimized-webp
//!   [1/3] 0001.jpg -> WEBP (12.3KB, Q=85)
//! Error with 1012B767/images/lv1/0002.jpg: Failed to decode ...
//!   [3/3] 0003.jpg -> JPEG (19.8KB, Q=35)
//!
//! ==================================================
//! Processed: 2 images
//! Failed: 1
//! Total size: 32.1KB (0.03MB)
//! Average size: 16.1KB
//! WebP: 1, JPEG: 1
//! Output: optimized-webp
//! OK: all images are under 20KB!
//! ==================================================
//! ```
//!
//! ## Gif
//!
//! ```text
//! Found 36 images, using 36 frames
//! Created product-360.gif
//!     Size: 812.4KB
//!     Dimensions: 150x150
//!     Frames: 36 of 36 images
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::animate::{AnimateEvent, GifOutcome};
use crate::config::{self, Config};
use crate::process::{BatchReport, FileOutcome, ProcessEvent};
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 50;

// ============================================================================
// Shared helpers
// ============================================================================

/// Bytes as kilobytes with one decimal.
fn format_kb(bytes: f64) -> String {
    format!("{:.1}KB", bytes / 1024.0)
}

/// Budget label: whole kilobytes print without decimals (`20KB`).
fn format_budget(bytes: u64) -> String {
    if bytes % 1024 == 0 {
        format!("{}KB", bytes / 1024)
    } else {
        format_kb(bytes as f64)
    }
}

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

fn error_line(source: &Path, message: &str) -> String {
    format!("Error with {}: {}", source.display(), message)
}

fn join_qualities(qualities: &[u32]) -> String {
    if qualities.is_empty() {
        return "(none)".to_string();
    }
    qualities
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Thumbs
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total, output_dir } => {
            vec![format!(
                "Processing {} images -> {}",
                total,
                output_dir.display()
            )]
        }
        ProcessEvent::FileFinished {
            index,
            total,
            outcome,
        } => match outcome {
            FileOutcome::Encoded(record) => vec![format!(
                "  [{}/{}] {} -> {} ({}, Q={})",
                index,
                total,
                record.filename,
                record.format.label(),
                format_kb(record.size as f64),
                record.quality
            )],
            FileOutcome::Failed(failed) => vec![error_line(&failed.source, &failed.message)],
        },
    }
}

/// Format the end-of-batch summary block.
pub fn format_summary(report: &BatchReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec![String::new(), banner()];
    lines.push(format!("Processed: {} images", report.processed()));
    if !report.failures.is_empty() {
        lines.push(format!("Failed: {}", report.failures.len()));
    }
    lines.push(format!(
        "Total size: {} ({:.2}MB)",
        format_kb(report.total_size as f64),
        report.total_size as f64 / (1024.0 * 1024.0)
    ));
    if let Some(avg) = report.average_size() {
        lines.push(format!("Average size: {}", format_kb(avg)));
    }
    lines.push(format!(
        "WebP: {}, JPEG: {}",
        report.webp_count, report.jpeg_count
    ));
    lines.push(format!("Output: {}", output_dir.display()));

    if report.processed() > 0 {
        let over = report.over_budget();
        let budget = format_budget(report.budget);
        if over.is_empty() {
            lines.push(format!("OK: all images are under {budget}!"));
        } else {
            lines.push(format!(
                "WARNING: {} images exceed {}:",
                over.len(),
                budget
            ));
            for record in over {
                lines.push(format!(
                    "  - {}: {} ({})",
                    record.filename,
                    format_kb(record.size as f64),
                    record.format.label()
                ));
            }
        }
    }
    lines.push(banner());
    lines
}

/// Print the summary block to stdout.
pub fn print_summary(report: &BatchReport, output_dir: &Path) {
    for line in format_summary(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Gif
// ============================================================================

/// Format a GIF progress event.
pub fn format_gif_event(event: &AnimateEvent) -> Vec<String> {
    match event {
        AnimateEvent::Started { inputs, selected } => {
            vec![format!("Found {} images, using {} frames", inputs, selected)]
        }
        AnimateEvent::FrameFailed { source, message } => vec![error_line(source, message)],
    }
}

/// Format the result of the `gif` command.
pub fn format_gif_summary(outcome: &GifOutcome) -> Vec<String> {
    vec![
        format!("Created {}", outcome.path.display()),
        format!("    Size: {}", format_kb(outcome.size as f64)),
        format!("    Dimensions: {}x{}", outcome.width, outcome.height),
        format!(
            "    Frames: {} of {} images",
            outcome.frames, outcome.inputs
        ),
    ]
}

/// Print the GIF result to stdout.
pub fn print_gif_summary(outcome: &GifOutcome) {
    for line in format_gif_summary(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the `check` command: inputs found and the effective settings.
pub fn format_check_output(config: &Config, inputs: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!(
        "Input: {} ({} images)",
        config.input_dir.display(),
        inputs.len()
    )];
    for input in inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        lines.push(format!("    {}", name));
    }
    lines.push(format!("Output: {}", config.output_dir.display()));
    lines.push(format!(
        "Canvas: {}x{} {} ({:?})",
        config.canvas.width, config.canvas.height, config.canvas.background, config.canvas.filter
    ));
    lines.push(format!("Budget: {}", format_budget(config.budget.max_bytes)));
    lines.push(format!(
        "WebP qualities: {} (method {})",
        join_qualities(&config.webp.qualities),
        config.webp.method
    ));
    lines.push(format!(
        "JPEG qualities: {}",
        join_qualities(&config.jpeg.qualities)
    ));
    lines.push(format!(
        "Workers: {}",
        config::effective_threads(&config.processing)
    ));
    lines
}

/// Print the `check` output to stdout.
pub fn print_check_output(config: &Config, inputs: &[PathBuf]) {
    for line in format_check_output(config, inputs) {
        println!("{}", line);
    }
}
