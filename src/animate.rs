//! Animated GIF preview.
//!
//! Turns the sorted inputs into one looping GIF: every `skip_frames + 1`-th
//! file is letterboxed onto a square canvas (same compositor as the
//! thumbnails) and becomes a frame. Files that fail to decode are reported
//! and left out.

use crate::config::{self, Config};
use crate::imaging::{BackendError, ImageBackend, RustBackend, load_canvas};
use crate::scan::{self, ScanError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnimateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("GIF encoding failed: {0}")]
    Backend(#[from] BackendError),
    #[error("No images found in {0}")]
    NoInputs(PathBuf),
    #[error("No frames could be loaded from {0}")]
    NoFrames(PathBuf),
}

/// Progress events emitted while frames are loaded.
#[derive(Debug, Clone)]
pub enum AnimateEvent {
    Started { inputs: usize, selected: usize },
    FrameFailed { source: PathBuf, message: String },
}

/// The written animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOutcome {
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    pub width: u32,
    pub height: u32,
    /// Frames in the animation.
    pub frames: usize,
    /// Matching input files found.
    pub inputs: usize,
}

/// Every `skip + 1`-th input, starting with the first.
pub fn select_frames(inputs: &[PathBuf], skip: usize) -> Vec<&Path> {
    inputs
        .iter()
        .step_by(skip + 1)
        .map(PathBuf::as_path)
        .collect()
}

/// Build the animation with the production backend.
pub fn build_gif(
    config: &Config,
    output: &Path,
    events: Option<Sender<AnimateEvent>>,
) -> Result<GifOutcome, AnimateError> {
    build_gif_with_backend(&RustBackend::new(), config, output, events)
}

/// Build the animation with an explicit backend.
pub fn build_gif_with_backend(
    backend: &impl ImageBackend,
    config: &Config,
    output: &Path,
    events: Option<Sender<AnimateEvent>>,
) -> Result<GifOutcome, AnimateError> {
    let inputs = scan::scan_inputs(&config.input_dir, &config.extensions)?;
    if inputs.is_empty() {
        return Err(AnimateError::NoInputs(config.input_dir.clone()));
    }

    let spec = config.gif_canvas_spec()?;
    let selected = select_frames(&inputs, config.gif.skip_frames);
    if let Some(tx) = &events {
        tx.send(AnimateEvent::Started {
            inputs: inputs.len(),
            selected: selected.len(),
        })
        .ok();
    }

    let mut frames = Vec::with_capacity(selected.len());
    for source in selected {
        match load_canvas(backend, source, &spec) {
            Ok(frame) => frames.push(frame),
            Err(e) => {
                tracing::debug!(source = %source.display(), error = %e, "frame skipped");
                if let Some(tx) = &events {
                    tx.send(AnimateEvent::FrameFailed {
                        source: source.to_path_buf(),
                        message: e.to_string(),
                    })
                    .ok();
                }
            }
        }
    }
    if frames.is_empty() {
        return Err(AnimateError::NoFrames(config.input_dir.clone()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let frame_count = frames.len();
    backend.write_gif(frames, config.gif.frame_delay_ms, output)?;
    let size = std::fs::metadata(output)?.len();
    tracing::info!(path = %output.display(), frames = frame_count, size, "gif written");

    Ok(GifOutcome {
        path: output.to_path_buf(),
        size,
        width: spec.width,
        height: spec.height,
        frames: frame_count,
        inputs: inputs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::fs;
    use tempfile::TempDir;

    fn setup(count: usize) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("frames");
        fs::create_dir_all(&input).unwrap();
        for i in 1..=count {
            fs::write(input.join(format!("{i:04}.jpg")), b"x").unwrap();
        }
        let config = Config {
            input_dir: input,
            ..Config::default()
        };
        (tmp, config)
    }

    #[test]
    fn select_frames_every_image_by_default() {
        let inputs: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        assert_eq!(select_frames(&inputs, 0).len(), 5);
    }

    #[test]
    fn select_frames_with_skip() {
        let inputs: Vec<PathBuf> = (0..7).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        let picked = select_frames(&inputs, 2);
        assert_eq!(
            picked,
            vec![Path::new("0.jpg"), Path::new("3.jpg"), Path::new("6.jpg")]
        );
    }

    #[test]
    fn builds_gif_from_all_inputs() {
        let (tmp, config) = setup(4);
        let output = tmp.path().join("spin.gif");
        let backend = MockBackend::new();

        let outcome = build_gif_with_backend(&backend, &config, &output, None).unwrap();

        assert_eq!(outcome.frames, 4);
        assert_eq!(outcome.inputs, 4);
        assert_eq!((outcome.width, outcome.height), (150, 150));
        assert_eq!(outcome.size, fs::metadata(&output).unwrap().len());
        assert!(backend.get_operations().contains(&RecordedOp::WriteGif {
            output: output.to_string_lossy().to_string(),
            frames: 4,
            frame_delay_ms: 50,
        }));
    }

    #[test]
    fn honours_skip_and_delay() {
        let (tmp, mut config) = setup(10);
        config.gif.skip_frames = 1;
        config.gif.frame_delay_ms = 80;
        let output = tmp.path().join("out").join("spin.gif");
        let backend = MockBackend::new();

        let outcome = build_gif_with_backend(&backend, &config, &output, None).unwrap();

        assert_eq!(outcome.frames, 5);
        assert_eq!(outcome.inputs, 10);
        assert!(output.exists());
        let decoded: Vec<String> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Decode(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(decoded.len(), 5);
        assert!(decoded[1].ends_with("0003.jpg"));
        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::WriteGif {
                frame_delay_ms: 80,
                ..
            }
        )));
    }

    #[test]
    fn undecodable_frames_are_skipped_and_reported() {
        let (tmp, config) = setup(3);
        let output = tmp.path().join("spin.gif");
        let backend = MockBackend::new().failing_on("0002.jpg");
        let (tx, rx) = std::sync::mpsc::channel();

        let outcome = build_gif_with_backend(&backend, &config, &output, Some(tx)).unwrap();
        let events: Vec<AnimateEvent> = rx.into_iter().collect();

        assert_eq!(outcome.frames, 2);
        assert!(matches!(
            events[0],
            AnimateEvent::Started {
                inputs: 3,
                selected: 3
            }
        ));
        assert!(matches!(
            &events[1],
            AnimateEvent::FrameFailed { source, .. } if source.ends_with("0002.jpg")
        ));
    }

    #[test]
    fn no_inputs_is_error() {
        let (tmp, config) = setup(0);
        let output = tmp.path().join("spin.gif");

        let result = build_gif_with_backend(&MockBackend::new(), &config, &output, None);

        assert!(matches!(result, Err(AnimateError::NoInputs(_))));
        assert!(!output.exists());
    }

    #[test]
    fn no_loadable_frames_is_error() {
        let (tmp, config) = setup(2);
        let output = tmp.path().join("spin.gif");
        let backend = MockBackend::new()
            .failing_on("0001.jpg")
            .failing_on("0002.jpg");

        let result = build_gif_with_backend(&backend, &config, &output, None);

        assert!(matches!(result, Err(AnimateError::NoFrames(_))));
        assert!(!output.exists());
    }
}
