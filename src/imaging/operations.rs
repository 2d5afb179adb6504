//! High-level image operations.
//!
//! These functions combine the canvas compositor with backend execution:
//! [`load_canvas`] decodes and letterboxes one source, and
//! [`encode_within_budget`] runs the quality search and leaves exactly one
//! output file on disk.
//!
//! ## Quality search
//!
//! ```text
//! WebP ladder  95 → 90 → … → 60     stop at the first size ≤ budget
//!     │ nothing fits
//!     ▼
//! JPEG ladder  50 → 45 → … → 10     stop at the first size ≤ budget
//!     │ nothing fits
//!     ▼
//! keep the smallest candidate seen in either ladder (flagged over budget)
//! ```
//!
//! Each attempt is encoded in memory; only the chosen candidate is written.

use super::backend::{BackendError, ImageBackend};
use super::canvas::{CanvasSpec, compose_canvas};
use super::params::{EncodeParams, OutputFormat, Quality};
use image::RgbImage;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Decode `source` and compose it onto a canvas.
///
/// The decoded bitmap is dropped before this returns; only the canvas lives on.
pub fn load_canvas(
    backend: &impl ImageBackend,
    source: &Path,
    spec: &CanvasSpec,
) -> Result<RgbImage> {
    let decoded = backend.decode(source)?;
    compose_canvas(&decoded, spec)
}

/// Configuration for the size-constrained encoder.
#[derive(Debug, Clone)]
pub struct BudgetConfig {
    /// Maximum accepted output size in bytes.
    pub max_bytes: u64,
    /// WebP qualities, tried in order.
    pub webp_qualities: Vec<Quality>,
    /// JPEG qualities, tried in order once no WebP quality fits.
    pub jpeg_qualities: Vec<Quality>,
    /// libwebp effort, 0..=6.
    pub webp_method: u8,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024,
            webp_qualities: [95, 90, 85, 80, 75, 70, 65, 60]
                .into_iter()
                .map(Quality::new)
                .collect(),
            jpeg_qualities: (10..=50).rev().step_by(5).map(Quality::new).collect(),
            webp_method: 6,
        }
    }
}

/// The encoding that was kept for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Size of the written file in bytes.
    pub size: u64,
    pub path: PathBuf,
    /// False when no quality in either ladder met the budget.
    pub within_budget: bool,
}

/// One in-memory encode attempt.
struct Candidate {
    format: OutputFormat,
    quality: Quality,
    bytes: Vec<u8>,
}

impl Candidate {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output path for `stem` in `format` inside `output_dir`.
pub fn output_path(output_dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

/// Walk one quality ladder.
///
/// Returns the first candidate within budget, if any. Candidates over budget
/// replace `smallest` when strictly smaller, so ties keep the earlier attempt.
fn search_ladder(
    backend: &impl ImageBackend,
    canvas: &RgbImage,
    format: OutputFormat,
    qualities: &[Quality],
    config: &BudgetConfig,
    smallest: &mut Option<Candidate>,
) -> Result<Option<Candidate>> {
    for &quality in qualities {
        let bytes = backend.encode(
            canvas,
            &EncodeParams {
                format,
                quality,
                webp_method: config.webp_method,
            },
        )?;
        let candidate = Candidate {
            format,
            quality,
            bytes,
        };
        tracing::debug!(%format, %quality, size = candidate.size(), "encode attempt");

        if candidate.size() <= config.max_bytes {
            return Ok(Some(candidate));
        }
        if smallest.as_ref().is_none_or(|s| candidate.size() < s.size()) {
            *smallest = Some(candidate);
        }
    }
    Ok(None)
}

/// Encode `canvas` as `<stem>.webp` or `<stem>.jpg` in `output_dir`, as large
/// a quality as fits `config.max_bytes`.
///
/// Exactly one of the two files exists afterwards: the other format's file is
/// removed if a previous run left it behind. When neither ladder fits the
/// budget the smallest candidate is written and `within_budget` is false.
pub fn encode_within_budget(
    backend: &impl ImageBackend,
    canvas: &RgbImage,
    output_dir: &Path,
    stem: &str,
    config: &BudgetConfig,
) -> Result<EncodeOutcome> {
    let mut smallest = None;

    let accepted = match search_ladder(
        backend,
        canvas,
        OutputFormat::WebP,
        &config.webp_qualities,
        config,
        &mut smallest,
    )? {
        Some(candidate) => Some(candidate),
        None => search_ladder(
            backend,
            canvas,
            OutputFormat::Jpeg,
            &config.jpeg_qualities,
            config,
            &mut smallest,
        )?,
    };

    let within_budget = accepted.is_some();
    let chosen = accepted.or(smallest).ok_or_else(|| {
        BackendError::ProcessingFailed("no quality levels configured".to_string())
    })?;
    if !within_budget {
        tracing::info!(
            stem,
            size = chosen.size(),
            budget = config.max_bytes,
            "no quality level fits the budget, keeping the smallest candidate"
        );
    }

    let path = output_path(output_dir, stem, chosen.format);
    write_atomically(output_dir, &path, &chosen.bytes)?;
    remove_if_exists(&output_path(output_dir, stem, chosen.format.other()))?;

    Ok(EncodeOutcome {
        format: chosen.format,
        quality: chosen.quality,
        size: chosen.size(),
        path,
        within_budget,
    })
}

/// Write through a temp file in the same directory, then rename into place.
pub(super) fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stray output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
