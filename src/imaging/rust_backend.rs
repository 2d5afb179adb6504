//! Production backend built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG) | `image::ImageReader` |
//! | Encode → WebP (lossy) | `webp` (libwebp, `encode_advanced`) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Animated GIF | `image::codecs::gif::GifEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::operations::write_atomically;
use super::params::{EncodeParams, OutputFormat};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ExtendedColorType, Frame, ImageReader, RgbImage};
use std::path::Path;

/// Speed for GIF palette quantisation (1 = best, 30 = fastest).
const GIF_ENCODE_SPEED: i32 = 10;

/// Backend using `image` for decoding, JPEG and GIF, and libwebp for WebP.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_webp(image: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    let (w, h) = image.dimensions();
    let encoder = webp::Encoder::from_rgb(image.as_raw(), w, h);

    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::ProcessingFailed("failed to create WebPConfig".into()))?;
    config.lossless = 0;
    config.quality = params.quality.value() as f32;
    config.method = i32::from(params.webp_method);

    let mem = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
    Ok(mem.to_vec())
}

fn encode_jpeg(image: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, params.quality.value() as u8);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
            })
    }

    fn encode(&self, image: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        match params.format {
            OutputFormat::WebP => encode_webp(image, params),
            OutputFormat::Jpeg => encode_jpeg(image, params),
        }
    }

    fn write_gif(
        &self,
        frames: Vec<RgbImage>,
        frame_delay_ms: u32,
        output: &Path,
    ) -> Result<(), BackendError> {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, GIF_ENCODE_SPEED);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| BackendError::ProcessingFailed(format!("GIF setup failed: {e}")))?;

            let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
            let frames = frames.into_iter().map(|frame| {
                let rgba = DynamicImage::ImageRgb8(frame).to_rgba8();
                Frame::from_parts(rgba, 0, 0, delay)
            });
            encoder
                .encode_frames(frames)
                .map_err(|e| BackendError::ProcessingFailed(format!("GIF encode failed: {e}")))?;
        }
        // Dropping the encoder writes the trailer; only a complete file is renamed in.
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        write_atomically(dir, output, &buf)
    }
}
