//! # thumbfit
//!
//! Batch thumbnailer for product photo sets. Every JPEG in a directory is
//! scaled to fit a fixed canvas (112×112 by default), centered on a white
//! background, and encoded at the highest quality that keeps the file within
//! a byte budget (20 KiB by default).
//!
//! # Pipeline
//!
//! ```text
//! scan        input dir   →  sorted list of *.jpg
//! process     per file    →  decode → letterbox → quality search → write
//! summary     outcomes    →  BatchReport (totals, formats, over-budget list)
//! ```
//!
//! The quality search tries WebP first, walking 95, 90, … 60 and stopping at
//! the first encode that fits. If none does, it walks JPEG 50, 45, … 10. If
//! still nothing fits, the smallest candidate from either ladder is kept and
//! flagged as over budget. Exactly one output file per input is left behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists matching input files, non-recursive, sorted by name |
//! | [`process`] | Batch driver: per-file outcomes folded into a [`process::BatchReport`] |
//! | [`animate`] | Builds a looping GIF preview from the same inputs |
//! | [`imaging`] | Canvas compositor, codec backend, size-constrained encoder |
//! | [`config`] | `thumbfit.toml` loading, merging over stock defaults, validation |
//! | [`output`] | Console formatting for progress lines and summaries |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Explicit Outcomes
//!
//! A file that fails to decode or encode does not abort the batch. It becomes
//! a [`process::FileOutcome::Failed`] and is listed in the report; the exit
//! status stays 0. Only an empty or missing input directory, or a bad config,
//! is fatal.
//!
//! ## In-Memory Encode Attempts
//!
//! Each quality level is encoded into a buffer and measured there. Only the
//! accepted candidate touches disk, written to a temp file in the output
//! directory and renamed into place.
//!
//! ## Backend Trait
//!
//! Codecs sit behind [`imaging::ImageBackend`]. Tests drive the search and
//! the batch driver through a mock that returns scripted sizes, so the
//! fallback paths are exercised without depending on encoder output.

pub mod animate;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
