//! Batch thumbnail generation.
//!
//! Takes every input found by [`scan`](crate::scan), letterboxes it onto the
//! configured canvas and runs the size-constrained encoder. Each file ends in
//! an explicit [`FileOutcome`]; a file that fails to decode or encode is
//! recorded and skipped, the rest of the batch carries on. Outcomes are
//! folded, in sorted input order, into a [`BatchReport`].
//!
//! ## Output Structure
//!
//! ```text
//! optimized-webp/
//! ├── 0001.webp      # WebP when some quality in 95..60 fits the budget
//! ├── 0002.webp
//! └── 0003.jpg       # JPEG fallback, quality 50..10
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed one after another by default. With
//! `processing.max_processes` above 1 (or 0 for all cores) they run on the
//! rayon pool; each task owns its bitmaps and reports progress over an mpsc
//! channel.

use crate::config::{self, Config};
use crate::imaging::{
    BackendError, BudgetConfig, CanvasSpec, EncodeOutcome, ImageBackend, OutputFormat, Quality,
    RustBackend, encode_within_budget, load_canvas,
};
use crate::scan::{self, ScanError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("No images found in {0}")]
    NoInputs(PathBuf),
}

/// The kept encoding for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// Source file name, e.g. `0001.jpg`.
    pub filename: String,
    pub format: OutputFormat,
    /// Output size in bytes.
    pub size: u64,
    pub quality: Quality,
    pub path: PathBuf,
    /// False when even the smallest candidate exceeded the budget.
    pub within_budget: bool,
}

impl ResultRecord {
    fn new(filename: String, outcome: EncodeOutcome) -> Self {
        Self {
            filename,
            format: outcome.format,
            size: outcome.size,
            quality: outcome.quality,
            path: outcome.path,
            within_budget: outcome.within_budget,
        }
    }
}

/// An input that produced no output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFile {
    pub filename: String,
    pub source: PathBuf,
    pub message: String,
}

/// Per-file result.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Encoded(ResultRecord),
    Failed(FailedFile),
}

impl FileOutcome {
    pub fn filename(&self) -> &str {
        match self {
            FileOutcome::Encoded(record) => &record.filename,
            FileOutcome::Failed(failed) => &failed.filename,
        }
    }
}

/// Progress events emitted during a batch run.
///
/// With parallel processing, `FileFinished` events may arrive out of input
/// order; `index` is always the file's 1-based position in the sorted input.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
        output_dir: PathBuf,
    },
    FileFinished {
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },
}

/// Aggregate of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Budget the run was configured with, in bytes.
    pub budget: u64,
    pub records: Vec<ResultRecord>,
    pub failures: Vec<FailedFile>,
    /// Sum of all output sizes in bytes.
    pub total_size: u64,
    pub webp_count: usize,
    pub jpeg_count: usize,
}

impl BatchReport {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// Fold one outcome into the totals.
    pub fn push(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Encoded(record) => {
                self.total_size += record.size;
                match record.format {
                    OutputFormat::WebP => self.webp_count += 1,
                    OutputFormat::Jpeg => self.jpeg_count += 1,
                }
                self.records.push(record);
            }
            FileOutcome::Failed(failed) => self.failures.push(failed),
        }
    }

    /// Number of files that produced an output.
    pub fn processed(&self) -> usize {
        self.records.len()
    }

    /// Mean output size in bytes, `None` when nothing was written.
    pub fn average_size(&self) -> Option<f64> {
        (!self.records.is_empty()).then(|| self.total_size as f64 / self.records.len() as f64)
    }

    /// Records whose output is larger than the budget.
    pub fn over_budget(&self) -> Vec<&ResultRecord> {
        self.records.iter().filter(|r| r.size > self.budget).collect()
    }
}

/// Run the batch with the production backend.
pub fn process(
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    process_with_backend(&RustBackend::new(), config, events)
}

/// Run the batch with an explicit backend.
///
/// Returns [`ProcessError::NoInputs`] before touching the output directory
/// when the input directory holds no matching files.
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let inputs = scan::scan_inputs(&config.input_dir, &config.extensions)?;
    if inputs.is_empty() {
        return Err(ProcessError::NoInputs(config.input_dir.clone()));
    }

    let canvas = config.canvas_spec()?;
    let budget = config.budget_config();
    let output_dir = config.output_dir.as_path();
    std::fs::create_dir_all(output_dir)?;

    let total = inputs.len();
    if let Some(tx) = &events {
        tx.send(ProcessEvent::Started {
            total,
            output_dir: output_dir.to_path_buf(),
        })
        .ok();
    }

    let conflicts = claim_output_stems(&inputs);

    let run = |(i, source): (usize, &PathBuf)| {
        let outcome = match &conflicts[i] {
            Some(message) => {
                tracing::debug!(source = %source.display(), reason = %message, "skipping file");
                FileOutcome::Failed(FailedFile {
                    filename: display_name(source),
                    source: source.clone(),
                    message: message.clone(),
                })
            }
            None => process_file(backend, source, output_dir, &canvas, &budget),
        };
        if let Some(tx) = &events {
            tx.send(ProcessEvent::FileFinished {
                index: i + 1,
                total,
                outcome: outcome.clone(),
            })
            .ok();
        }
        outcome
    };

    let outcomes: Vec<FileOutcome> = if config::effective_threads(&config.processing) > 1 {
        inputs.par_iter().enumerate().map(run).collect()
    } else {
        inputs.iter().enumerate().map(run).collect()
    };

    let mut report = BatchReport::new(budget.max_bytes);
    for outcome in outcomes {
        report.push(outcome);
    }
    Ok(report)
}

/// Decode, letterbox and encode one file. Never fails; errors become
/// [`FileOutcome::Failed`].
pub fn process_file(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    canvas: &CanvasSpec,
    budget: &BudgetConfig,
) -> FileOutcome {
    let filename = display_name(source);

    match encode_file(backend, source, output_dir, canvas, budget) {
        Ok(outcome) => FileOutcome::Encoded(ResultRecord::new(filename, outcome)),
        Err(e) => {
            tracing::debug!(source = %source.display(), error = %e, "skipping file");
            FileOutcome::Failed(FailedFile {
                filename,
                source: source.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

fn encode_file(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    canvas: &CanvasSpec,
    budget: &BudgetConfig,
) -> Result<EncodeOutcome, BackendError> {
    let stem = output_stem(source);
    // The canvas is dropped when this returns, before the next file starts.
    let canvas = load_canvas(backend, source, canvas)?;
    encode_within_budget(backend, &canvas, output_dir, &stem, budget)
}

/// Inputs whose output stem was already claimed by an earlier input.
///
/// `a.jpg` and `a.JPG` both map to `a.webp`; the first in sorted order keeps
/// the name and each later one gets a conflict message. Stems compare
/// case-insensitively so the check holds on case-folding filesystems too.
fn claim_output_stems(inputs: &[PathBuf]) -> Vec<Option<String>> {
    let mut claimed: HashMap<String, String> = HashMap::new();
    inputs
        .iter()
        .map(|source| {
            let stem = output_stem(source);
            let name = display_name(source);
            match claimed.get(&stem.to_lowercase()) {
                Some(first) => Some(format!(
                    "duplicate output name: {stem} is already produced by {first}"
                )),
                None => {
                    claimed.insert(stem.to_lowercase(), name);
                    None
                }
            }
        })
        .collect()
}

fn display_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}

/// File stem used for the output name.
fn output_stem(source: &Path) -> String {
    let stem = source.file_stem().unwrap_or_default();
    match stem.to_str() {
        Some(s) => s.to_string(),
        None => {
            let lossy = stem.to_string_lossy().into_owned();
            tracing::warn!(
                source = %source.display(),
                stem = %lossy,
                "non-UTF-8 file name, output renamed"
            );
            lossy
        }
    }
}
