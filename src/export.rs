//! Writing tray contents to disk.
//!
//! Each tray item is written as its PNG under its assigned filename, then an
//! `export-manifest.json` is written alongside listing what was exported:
//!
//! ```json
//! {
//!   "generator": "shotframe 0.4.0",
//!   "items": [
//!     {
//!       "filename": "apple_phone_6.7_rect_01.png",
//!       "device": "iphone-67",
//!       "platform": "apple",
//!       "mode": "rectangle",
//!       "width": 1290,
//!       "height": 2796,
//!       "bytes": 482113,
//!       "sha256": "9f2c…"
//!     }
//!   ]
//! }
//! ```
//!
//! The digest lets a later run (or a store upload script) confirm the files
//! on disk are the ones that were rendered.

use crate::devices::{DeviceId, Platform};
use crate::session::TrayItem;
use crate::types::ExportMode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the manifest written next to the exported PNGs.
pub const MANIFEST_FILENAME: &str = "export-manifest.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub generator: String,
    pub items: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub device: DeviceId,
    pub platform: Platform,
    pub mode: ExportMode,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub sha256: String,
}

impl ExportManifest {
    pub fn load(dir: &Path) -> Result<Self, ExportError> {
        let content = fs::read_to_string(dir.join(MANIFEST_FILENAME))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Entries whose file is missing or no longer matches its digest.
    pub fn verify(&self, dir: &Path) -> Vec<PathBuf> {
        self.items
            .iter()
            .map(|entry| dir.join(&entry.filename))
            .zip(&self.items)
            .filter(|(path, entry)| !hash_file(path).is_ok_and(|digest| digest == entry.sha256))
            .map(|(path, _)| path)
            .collect()
    }
}

/// SHA-256 of a byte buffer, as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents, as lowercase hex.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

/// Write `items` into `dir` (created if missing) and the manifest after them.
#[tracing::instrument(skip(items), fields(dir = %dir.display()))]
pub fn export_items<'a, I>(items: I, dir: &Path) -> Result<ExportManifest, ExportError>
where
    I: IntoIterator<Item = &'a TrayItem>,
{
    fs::create_dir_all(dir)?;

    let mut entries = Vec::new();
    for item in items {
        let variant = &item.variant;
        fs::write(dir.join(&item.filename), &variant.png)?;
        tracing::debug!(filename = %item.filename, bytes = variant.png.len(), "wrote variant");
        entries.push(ManifestEntry {
            filename: item.filename.clone(),
            device: variant.device,
            platform: item.platform,
            mode: item.mode,
            width: variant.width,
            height: variant.height,
            bytes: variant.png.len(),
            sha256: hash_bytes(&variant.png),
        });
    }

    let manifest = ExportManifest {
        generator: format!("shotframe {}", env!("CARGO_PKG_VERSION")),
        items: entries,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join(MANIFEST_FILENAME), json)?;
    Ok(manifest)
}
