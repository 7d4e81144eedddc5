//! Canonical normalization of an upload.
//!
//! Runs once per accepted upload, before any crop or adjustment edits:
//!
//! ```text
//! decoded upload ──► detect_borders ──► platform inset ──► 1:1 extraction ──► MasterImage
//! ```
//!
//! Apple screenshots get an extra symmetric inset measured from the detected
//! crop itself: 4% per side for a *standard* full-screen capture (the crop
//! spans ≥95% of the source on either axis), 8% for a *modal* capture that
//! already carries framing of its own. Android crops are used as detected.
//!
//! The extracted buffer becomes the [`MasterImage`]. It is never mutated;
//! every render reads it fresh, and crops from then on are relative to it.

use super::backend::BackendError;
use super::borders::detect_borders;
use super::calculations::crop_to_pixels;
use crate::devices::Platform;
use crate::types::CropArea;
use image::RgbaImage;
use image::imageops;
use std::sync::Arc;

/// Crop span (percent, either axis) at or above which a capture is "standard".
pub const STANDARD_VIEW_THRESHOLD: f64 = 95.0;
pub const STANDARD_VIEW_INSET: f64 = 0.04;
pub const MODAL_VIEW_INSET: f64 = 0.08;

/// The immutable editing anchor for one upload.
///
/// Cloning is cheap and shares the pixels, so concurrent renders can each
/// hold their own handle without copying or locking.
#[derive(Debug, Clone)]
pub struct MasterImage(Arc<RgbaImage>);

impl MasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

/// How an Apple capture was classified for insetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewClass {
    Standard,
    Modal,
}

impl ViewClass {
    pub fn classify(crop: &CropArea) -> Self {
        if crop.width >= STANDARD_VIEW_THRESHOLD || crop.height >= STANDARD_VIEW_THRESHOLD {
            ViewClass::Standard
        } else {
            ViewClass::Modal
        }
    }

    pub fn inset_fraction(self) -> f64 {
        match self {
            ViewClass::Standard => STANDARD_VIEW_INSET,
            ViewClass::Modal => MODAL_VIEW_INSET,
        }
    }
}

/// Inset a detected crop by its view-class fraction of the crop's own size.
pub fn apple_inset(detected: &CropArea) -> (CropArea, ViewClass) {
    let class = ViewClass::classify(detected);
    let ix = detected.width * class.inset_fraction();
    let iy = detected.height * class.inset_fraction();
    let crop = CropArea {
        x: detected.x + ix,
        y: detected.y + iy,
        width: detected.width - 2.0 * ix,
        height: detected.height - 2.0 * iy,
    };
    (crop, class)
}

/// Crop that normalization extracts for a platform.
pub fn platform_crop(detected: &CropArea, platform: Platform) -> (CropArea, Option<ViewClass>) {
    match platform {
        Platform::Apple => {
            let (crop, class) = apple_inset(detected);
            (crop, Some(class))
        }
        Platform::Android => (*detected, None),
    }
}

/// Extract the platform-adjusted crop of `source` into a fresh master buffer.
#[tracing::instrument(skip(source), fields(width = source.width(), height = source.height()))]
pub fn normalize(
    source: &RgbaImage,
    detected: &CropArea,
    platform: Platform,
) -> Result<MasterImage, BackendError> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(BackendError::NoRenderContext(format!(
            "cannot normalize a {width}x{height} image"
        )));
    }
    detected.validate()?;

    let (crop, _) = platform_crop(detected, platform);
    let (x, y, w, h) = crop_to_pixels(&crop, width, height);
    tracing::debug!(%crop, x, y, w, h, "extracting canonical region");

    Ok(MasterImage::new(imageops::crop_imm(source, x, y, w, h).to_image()))
}

/// What normalization did to an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub source_width: u32,
    pub source_height: u32,
    pub detected: CropArea,
    pub applied: CropArea,
    pub view_class: Option<ViewClass>,
    /// Normalization failed and the raw upload became the master.
    pub fell_back: bool,
}

/// Result of establishing the master for a fresh upload.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub master: MasterImage,
    pub report: NormalizeReport,
}

/// Detect, normalize, and fall back to the raw upload if normalization fails.
///
/// Never loses the upload: on failure the source itself becomes the master
/// and the report says so.
pub fn establish_master(source: RgbaImage, platform: Platform) -> Normalized {
    let detected = detect_borders(&source);
    let (applied, view_class) = platform_crop(&detected, platform);
    let (source_width, source_height) = source.dimensions();

    let (master, fell_back) = match normalize(&source, &detected, platform) {
        Ok(master) => (master, false),
        Err(e) => {
            tracing::warn!(error = %e, "normalization failed, using raw upload as master");
            (MasterImage::new(source), true)
        }
    };

    Normalized {
        master,
        report: NormalizeReport {
            source_width,
            source_height,
            detected,
            applied,
            view_class,
            fell_back,
        },
    }
}
