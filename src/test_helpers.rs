//! Shared test utilities.
//!
//! Synthetic JPEG fixtures and deterministic noise canvases, so tests never
//! depend on image files checked into the repository.

use image::{Rgb, RgbImage};
use std::path::Path;

// =========================================================================
// Fixture files
// =========================================================================

/// Write a `width`×`height` JPEG with a smooth gradient to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    img.save(path).unwrap();
}

// =========================================================================
// In-memory images
// =========================================================================

/// Deterministic per-pixel noise (no RNG dependency).
pub fn noise_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let mut h = x.wrapping_mul(0x9E37_79B9) ^ y.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        Rgb([h as u8, (h >> 8) as u8, (h >> 16) as u8])
    })
}
