//! Image processing: letterbox compositing and size-constrained encoding.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Canvas** | `fast_image_resize` box filter + `image::imageops::replace` |
//! | **Encode → WebP** | `webp` (libwebp, lossy) |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//! | **Animated GIF** | `image::codecs::gif::GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement math (unit testable)
//! - **Parameters**: Quality, output format, encode attempt description
//! - **Canvas**: The compositor that scales and centers a source image
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Decode-to-canvas and the quality search

pub mod backend;
mod calculations;
pub mod canvas;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{Placement, calculate_fit_dimensions, calculate_placement};
pub use canvas::{CanvasSpec, ResampleFilter, compose_canvas};
pub use operations::{BudgetConfig, EncodeOutcome, encode_within_budget, load_canvas, output_path};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
