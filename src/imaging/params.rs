//! Parameter types for image operations.
//!
//! These types describe *what* to produce, not *how*. They are the interface
//! between the high-level [`operations`](super::operations) module (which runs
//! the quality search) and the [`backend`](super::backend) (which does the
//! actual codec work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: The two lossy output formats: WebP (primary) and JPEG (legacy).
//! - [`EncodeParams`]: One encode attempt: format, quality and WebP effort.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lossy output format.
///
/// WebP is tried first; JPEG is the fallback when no WebP quality level fits
/// the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    WebP,
    Jpeg,
}

impl OutputFormat {
    /// File extension written for this format (no leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Upper-case label used in progress and summary output.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::WebP => "WEBP",
            OutputFormat::Jpeg => "JPEG",
        }
    }

    /// The other format. Used to clean up stray outputs.
    pub fn other(self) -> Self {
        match self {
            OutputFormat::WebP => OutputFormat::Jpeg,
            OutputFormat::Jpeg => OutputFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters for a single in-memory encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
    /// libwebp effort (0 = fastest, 6 = smallest). Ignored for JPEG.
    pub webp_method: u8,
}
