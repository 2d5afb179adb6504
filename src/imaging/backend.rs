//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the codec operations the pipeline
//! needs: decode, encode (one lossy attempt, in memory) and write an
//! animated GIF. Everything above it (canvas composition, the quality
//! search, the batch driver) is backend-agnostic, so tests swap in a mock
//! that returns scripted encoded sizes.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::EncodeParams;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Decode an image file into memory.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode a canvas with the given format and quality, returning the bytes.
    fn encode(&self, image: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;

    /// Write `frames` as a looping animated GIF with a fixed per-frame delay.
    fn write_gif(
        &self,
        frames: Vec<RgbImage>,
        frame_delay_ms: u32,
        output: &Path,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns scripted results.
    ///
    /// Decoding yields a solid `width`×`height` image unless the file name
    /// is listed in `failing`. Encoding returns `size` zero bytes, where the
    /// size comes from `sizes` keyed by (format, quality), else `default_size`.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        pub width: u32,
        pub height: u32,
        pub failing: Vec<String>,
        pub sizes: HashMap<(OutputFormat, u32), usize>,
        pub default_size: usize,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Encode {
            format: OutputFormat,
            quality: u32,
            webp_method: u8,
            width: u32,
            height: u32,
        },
        WriteGif {
            output: String,
            frames: usize,
            frame_delay_ms: u32,
        },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                width: 800,
                height: 600,
                failing: Vec::new(),
                sizes: HashMap::new(),
                default_size: 1024,
                operations: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every encode attempt returns `size` bytes unless scripted otherwise.
        pub fn with_default_size(mut self, size: usize) -> Self {
            self.default_size = size;
            self
        }

        /// Script the encoded size for specific (format, quality) pairs.
        pub fn with_sizes(mut self, sizes: &[(OutputFormat, u32, usize)]) -> Self {
            for &(format, quality, size) in sizes {
                self.sizes.insert((format, quality), size);
            }
            self
        }

        /// Decoding any file with this name fails.
        pub fn failing_on(mut self, file_name: &str) -> Self {
            self.failing.push(file_name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// The (format, quality) pairs tried, in order.
        pub fn encode_attempts(&self) -> Vec<(OutputFormat, u32)> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode {
                        format, quality, ..
                    } => Some((format, quality)),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: mock decode failure",
                    path.display()
                )));
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                self.width,
                self.height,
                image::Rgb([40, 80, 120]),
            )))
        }

        fn encode(
            &self,
            image: &RgbImage,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                format: params.format,
                quality: params.quality.value(),
                webp_method: params.webp_method,
                width: image.width(),
                height: image.height(),
            });
            let size = self
                .sizes
                .get(&(params.format, params.quality.value()))
                .copied()
                .unwrap_or(self.default_size);
            Ok(vec![0u8; size])
        }

        fn write_gif(
            &self,
            frames: Vec<RgbImage>,
            frame_delay_ms: u32,
            output: &Path,
        ) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::WriteGif {
                output: output.to_string_lossy().to_string(),
                frames: frames.len(),
                frame_delay_ms,
            });
            std::fs::write(output, vec![0u8; 64 * frames.len()])?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::new();
        let img = backend.decode(Path::new("/test/image.jpg")).unwrap();
        assert_eq!((img.width(), img.height()), (800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_decode_fails_for_listed_names() {
        let backend = MockBackend::new().failing_on("broken.jpg");
        assert!(backend.decode(Path::new("/in/broken.jpg")).is_err());
        assert!(backend.decode(Path::new("/in/fine.jpg")).is_ok());
    }

    #[test]
    fn mock_encode_uses_scripted_sizes() {
        let backend = MockBackend::new()
            .with_default_size(50_000)
            .with_sizes(&[(OutputFormat::WebP, 80, 900)]);
        let canvas = RgbImage::new(112, 112);

        let hit = backend
            .encode(
                &canvas,
                &EncodeParams {
                    format: OutputFormat::WebP,
                    quality: Quality::new(80),
                    webp_method: 6,
                },
            )
            .unwrap();
        let miss = backend
            .encode(
                &canvas,
                &EncodeParams {
                    format: OutputFormat::Jpeg,
                    quality: Quality::new(80),
                    webp_method: 6,
                },
            )
            .unwrap();

        assert_eq!(hit.len(), 900);
        assert_eq!(miss.len(), 50_000);
        assert_eq!(
            backend.encode_attempts(),
            vec![(OutputFormat::WebP, 80), (OutputFormat::Jpeg, 80)]
        );
    }
}
