//! Screenshot discovery for batch runs.
//!
//! Walks a directory tree and returns every decodable screenshot in a
//! stable order (sorted by file name at each level):
//!
//! ```text
//! screens/
//! ├── 01-home.png              ✓
//! ├── 02-search.jpg            ✓
//! ├── notes.txt                ✗ not an image
//! ├── .cache/                  ✗ hidden
//! ├── onboarding/
//! │   └── welcome.webp         ✓
//! └── store/                   ✗ output directory
//!     └── apple_phone_6.7_rect_01.png
//! ```
//!
//! Files named like exported variants are skipped wherever they are, so
//! re-running a batch over its own output never feeds renders back in.

use crate::imaging::rust_backend::is_supported_input;
use crate::naming::parse_variant_filename;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_exported_variant(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| parse_variant_filename(n).is_some())
}

/// Every screenshot under `root`, skipping `exclude` (typically the output
/// directory) and hidden entries.
pub fn find_screenshots(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && exclude.is_none_or(|ex| e.path() != ex));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && is_supported_input(path) && !is_exported_variant(path) {
            found.push(path.to_path_buf());
        }
    }

    tracing::debug!(root = %root.display(), count = found.len(), "found screenshots");
    Ok(found)
}
