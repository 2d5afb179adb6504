//! Input discovery.
//!
//! Lists the files directly inside the input directory whose extension is in
//! the configured list (case-insensitive), sorted by file name. Subdirectories
//! are not descended into.
//!
//! ```text
//! 1012B767/images/lv1/
//! ├── 0001.jpg        ✓
//! ├── 0002.JPG        ✓  (extension match ignores case)
//! ├── notes.txt       ✗
//! └── raw/            ✗  (not scanned)
//!     └── 0003.jpg
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to read input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// List input images in `dir`, sorted by file name.
///
/// `extensions` are given without the leading dot. An empty result is not an
/// error here; callers decide what an empty batch means.
pub fn scan_inputs(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
