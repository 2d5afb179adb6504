//! Canvas compositor: scale a source image into a fixed-size letterbox.
//!
//! The source is flattened onto the background colour (so the canvas is
//! always opaque), resampled to the size computed by
//! [`calculate_placement`](super::calculations::calculate_placement) and
//! pasted centered onto a canvas filled with the background colour.
//!
//! Resampling uses `fast_image_resize` convolution. The default box filter
//! averages every source pixel that falls under a destination pixel, which is
//! the area-averaging behaviour thumbnails want when shrinking large photos.

use super::backend::BackendError;
use super::calculations::calculate_placement;
use fast_image_resize::{self as fir, PixelType, ResizeAlg, ResizeOptions};
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Resampling filter used when scaling the source onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Box filter: area averaging.
    #[default]
    Area,
    /// Lanczos3: sharper, may ring on hard edges.
    Lanczos3,
}

impl ResampleFilter {
    fn to_fir(self) -> fir::FilterType {
        match self {
            ResampleFilter::Area => fir::FilterType::Box,
            ResampleFilter::Lanczos3 => fir::FilterType::Lanczos3,
        }
    }
}

/// Target canvas description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub filter: ResampleFilter,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 112,
            height: 112,
            background: Rgb([255, 255, 255]),
            filter: ResampleFilter::Area,
        }
    }
}

/// Compose `source` onto a new canvas of exactly `spec.width × spec.height`.
pub fn compose_canvas(source: &DynamicImage, spec: &CanvasSpec) -> Result<RgbImage, BackendError> {
    let (src_w, src_h) = (source.width(), source.height());
    if src_w == 0 || src_h == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "source image has no pixels ({src_w}x{src_h})"
        )));
    }

    let placement = calculate_placement((src_w, src_h), (spec.width, spec.height));
    let flat = flatten(source, spec.background);
    let scaled = resample(flat, placement.width, placement.height, spec.filter)?;

    let mut canvas = RgbImage::from_pixel(spec.width, spec.height, spec.background);
    image::imageops::replace(&mut canvas, &scaled, placement.x as i64, placement.y as i64);
    Ok(canvas)
}

/// Convert to RGB8, blending any alpha channel over the background.
fn flatten(source: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !source.color().has_alpha() {
        return source.to_rgb8();
    }

    let rgba = source.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let fg = src[c] as u32 * alpha;
            let bg = background[c] as u32 * (255 - alpha);
            dst[c] = ((fg + bg + 127) / 255) as u8;
        }
    }
    out
}

fn resample(
    src: RgbImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<RgbImage, BackendError> {
    if src.dimensions() == (width, height) {
        return Ok(src);
    }

    let (src_w, src_h) = src.dimensions();
    let src_image = fir::images::Image::from_vec_u8(src_w, src_h, src.into_raw(), PixelType::U8x3)
        .map_err(|e| BackendError::ProcessingFailed(format!("resample source: {e:?}")))?;
    let mut dst_image = fir::images::Image::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter.to_fir()));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| BackendError::ProcessingFailed(format!("resample failed: {e:?}")))?;

    RgbImage::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
        BackendError::ProcessingFailed("resampled buffer has the wrong size".to_string())
    })
}
