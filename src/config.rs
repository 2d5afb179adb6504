//! Run configuration.
//!
//! Handles loading, validating, and merging `thumbfit.toml`. Stock defaults
//! reproduce the classic job (112×112 white canvas, 20 KiB budget, WebP
//! 95→60, JPEG 50→10); a config file overrides just the keys it names, and
//! the `--source` / `--output` flags override the directories on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "1012B767/images/lv1"
//! output_dir = "optimized-webp"
//! extensions = ["jpg"]        # matched case-insensitively
//!
//! [canvas]
//! width = 112
//! height = 112
//! background = "#ffffff"
//! filter = "area"             # "area" or "lanczos3"
//!
//! [budget]
//! max_bytes = 20480
//!
//! [webp]
//! qualities = [95, 90, 85, 80, 75, 70, 65, 60]
//! method = 6                  # libwebp effort 0-6
//!
//! [jpeg]
//! qualities = [50, 45, 40, 35, 30, 25, 20, 15, 10]
//!
//! [gif]
//! size = 150
//! frame_delay_ms = 50
//! skip_frames = 0
//! output_file = "product-360.gif"
//!
//! [processing]
//! max_processes = 1           # 0 = one worker per CPU core
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BudgetConfig, CanvasSpec, Quality, ResampleFilter};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "thumbfit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full run configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for source images (not recursive).
    pub input_dir: PathBuf,
    /// Directory the thumbnails are written to. Created when missing.
    pub output_dir: PathBuf,
    /// Source file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Target canvas.
    pub canvas: CanvasConfig,
    /// Output size limit.
    pub budget: BudgetSection,
    /// Primary format settings.
    pub webp: WebpConfig,
    /// Fallback format settings.
    pub jpeg: JpegConfig,
    /// Animated GIF settings.
    pub gif: GifConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("1012B767/images/lv1"),
            output_dir: PathBuf::from("optimized-webp"),
            extensions: vec!["jpg".to_string()],
            canvas: CanvasConfig::default(),
            budget: BudgetSection::default(),
            webp: WebpConfig::default(),
            jpeg: JpegConfig::default(),
            gif: GifConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be non-zero".into(),
            ));
        }
        parse_hex_color(&self.canvas.background)?;
        if self.budget.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "budget.max_bytes must be non-zero".into(),
            ));
        }
        if self.webp.qualities.is_empty() {
            return Err(ConfigError::Validation(
                "webp.qualities must not be empty".into(),
            ));
        }
        validate_ladder("webp.qualities", &self.webp.qualities)?;
        validate_ladder("jpeg.qualities", &self.jpeg.qualities)?;
        if self.webp.method > 6 {
            return Err(ConfigError::Validation("webp.method must be 0-6".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if self.gif.size == 0 {
            return Err(ConfigError::Validation("gif.size must be non-zero".into()));
        }
        Ok(())
    }

    /// Canvas used for thumbnails.
    pub fn canvas_spec(&self) -> Result<CanvasSpec, ConfigError> {
        Ok(CanvasSpec {
            width: self.canvas.width,
            height: self.canvas.height,
            background: parse_hex_color(&self.canvas.background)?,
            filter: self.canvas.filter,
        })
    }

    /// Square canvas used for GIF frames; shares background and filter.
    pub fn gif_canvas_spec(&self) -> Result<CanvasSpec, ConfigError> {
        Ok(CanvasSpec {
            width: self.gif.size,
            height: self.gif.size,
            ..self.canvas_spec()?
        })
    }

    /// Quality search settings.
    pub fn budget_config(&self) -> BudgetConfig {
        BudgetConfig {
            max_bytes: self.budget.max_bytes,
            webp_qualities: self.webp.qualities.iter().copied().map(Quality::new).collect(),
            jpeg_qualities: self.jpeg.qualities.iter().copied().map(Quality::new).collect(),
            webp_method: self.webp.method,
        }
    }
}

/// Quality ladders must be in 1..=100 and strictly descending.
fn validate_ladder(name: &str, qualities: &[u32]) -> Result<(), ConfigError> {
    if let Some(q) = qualities.iter().find(|q| !(1..=100).contains(*q)) {
        return Err(ConfigError::Validation(format!(
            "{name} values must be 1-100, got {q}"
        )));
    }
    if qualities.windows(2).any(|w| w[0] <= w[1]) {
        return Err(ConfigError::Validation(format!(
            "{name} must be strictly descending"
        )));
    }
    Ok(())
}

/// Parse a `#rrggbb` colour.
pub fn parse_hex_color(value: &str) -> Result<Rgb<u8>, ConfigError> {
    let invalid = || ConfigError::Validation(format!("invalid colour {value:?}, expected #rrggbb"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Target canvas settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Padding colour as `#rrggbb`.
    pub background: String,
    /// Resampling filter: `area` (box average) or `lanczos3`.
    pub filter: ResampleFilter,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 112,
            height: 112,
            background: "#ffffff".to_string(),
            filter: ResampleFilter::Area,
        }
    }
}

/// Output size limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetSection {
    /// Largest accepted file size in bytes.
    pub max_bytes: u64,
}

impl Default for BudgetSection {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024,
        }
    }
}

/// WebP (primary format) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    /// Qualities tried in order; the first that fits the budget wins.
    pub qualities: Vec<u32>,
    /// libwebp compression effort (0 = fastest, 6 = smallest output).
    pub method: u8,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            qualities: vec![95, 90, 85, 80, 75, 70, 65, 60],
            method: 6,
        }
    }
}

/// JPEG (fallback format) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    /// Qualities tried in order once no WebP quality fits. May be empty.
    pub qualities: Vec<u32>,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            qualities: (10..=50).rev().step_by(5).collect(),
        }
    }
}

/// Animated GIF settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    /// Edge length of the square frame canvas.
    pub size: u32,
    /// Delay between frames in milliseconds.
    pub frame_delay_ms: u32,
    /// Inputs skipped between kept frames (0 = use every image).
    pub skip_frames: usize,
    /// Default output path for the `gif` command.
    pub output_file: PathBuf,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            size: 150,
            frame_delay_ms: 50,
            skip_frames: 0,
            output_file: PathBuf::from("product-360.gif"),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Worker count. 1 processes files one after another; 0 means one
    /// worker per CPU core. Values above the core count are clamped down.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_processes: 1 }
    }
}

/// Resolve the effective thread count from config.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.max_processes {
        0 => cores,
        n => n.min(cores),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration.
///
/// With an explicit `path` the file must exist. Without one,
/// [`DEFAULT_CONFIG_FILE`] in the working directory is used if present,
/// otherwise the stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let overlay = match path {
        Some(p) => Some(load_raw_config(p)?),
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                Some(load_raw_config(implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `thumbfit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbfit configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as ./thumbfit.toml or pass --config <FILE>.
# --source and --output override input_dir and output_dir.
# Unknown keys will cause an error.

# Directory scanned for source images (not recursive).
input_dir = "1012B767/images/lv1"

# Directory the thumbnails are written to (created when missing).
output_dir = "optimized-webp"

# Source file extensions, matched case-insensitively.
extensions = ["jpg"]

# ---------------------------------------------------------------------------
# Canvas: every source is scaled to fit and centered on this canvas
# ---------------------------------------------------------------------------
[canvas]
width = 112
height = 112

# Padding colour around the scaled image.
background = "#ffffff"

# Resampling filter: "area" (box average) or "lanczos3".
filter = "area"

# ---------------------------------------------------------------------------
# Size budget
# ---------------------------------------------------------------------------
[budget]
# Largest accepted output size in bytes (20 KiB).
max_bytes = 20480

# ---------------------------------------------------------------------------
# WebP: tried first, highest quality that fits wins
# ---------------------------------------------------------------------------
[webp]
qualities = [95, 90, 85, 80, 75, 70, 65, 60]

# libwebp effort, 0 (fastest) to 6 (smallest output).
method = 6

# ---------------------------------------------------------------------------
# JPEG: fallback when no WebP quality fits
# ---------------------------------------------------------------------------
[jpeg]
qualities = [50, 45, 40, 35, 30, 25, 20, 15, 10]

# ---------------------------------------------------------------------------
# Animated GIF (the `gif` command)
# ---------------------------------------------------------------------------
[gif]
# Square frame size in pixels.
size = 150

# Delay between frames in milliseconds.
frame_delay_ms = 50

# Images skipped between kept frames (0 = use every image).
skip_frames = 0

output_file = "product-360.gif"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Parallel workers. 1 = one file at a time, 0 = one per CPU core.
max_processes = 1
"##
}
