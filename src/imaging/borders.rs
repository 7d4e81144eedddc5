//! Uniform-border detection.
//!
//! The top-left pixel is taken as the edge color. Rows matching it (every
//! pixel within ±[`EDGE_TOLERANCE`] on R, G and B; alpha ignored) are
//! trimmed from the top, then independently from the bottom. Columns are
//! never trimmed: `left` and `right` stay at the image edges, which keeps the
//! canonical crop of existing content stable.

use crate::types::CropArea;
use image::{Rgba, RgbaImage};

/// Per-channel tolerance on the 0–255 scale.
pub const EDGE_TOLERANCE: u8 = 5;

/// Pixel bounds of the detected content, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    /// Express the bounds as a percentage crop of a `width × height` image.
    pub fn to_crop(&self, width: u32, height: u32) -> CropArea {
        let w = width as f64;
        let h = height as f64;
        CropArea {
            x: self.left as f64 * 100.0 / w,
            y: self.top as f64 * 100.0 / h,
            width: (self.right - self.left + 1) as f64 * 100.0 / w,
            height: (self.bottom - self.top + 1) as f64 * 100.0 / h,
        }
    }
}

fn matches_edge(px: &Rgba<u8>, edge: &Rgba<u8>) -> bool {
    px.0[..3]
        .iter()
        .zip(&edge.0[..3])
        .all(|(a, b)| a.abs_diff(*b) <= EDGE_TOLERANCE)
}

fn row_is_uniform(image: &RgbaImage, y: u32, edge: &Rgba<u8>) -> bool {
    (0..image.width()).all(|x| matches_edge(image.get_pixel(x, y), edge))
}

/// Scan for uniform top and bottom borders.
///
/// Returns `None` for an empty image.
pub fn find_content_bounds(image: &RgbaImage) -> Option<ContentBounds> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let edge = *image.get_pixel(0, 0);
    let mut top = 0;
    let mut bottom = height - 1;

    while top < bottom && row_is_uniform(image, top, &edge) {
        top += 1;
    }
    if top == bottom && row_is_uniform(image, bottom, &edge) {
        // Nothing but border: keep the first row.
        top = 0;
        bottom = 0;
    }
    while bottom > top && row_is_uniform(image, bottom, &edge) {
        bottom -= 1;
    }

    Some(ContentBounds {
        left: 0,
        top,
        right: width - 1,
        bottom,
    })
}

/// Detect uniform borders and return the content as a percentage crop.
///
/// Fails open: an image with no pixels yields [`CropArea::FULL`] so the
/// caller can always proceed.
#[tracing::instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn detect_borders(image: &RgbaImage) -> CropArea {
    match find_content_bounds(image) {
        Some(bounds) => {
            let crop = bounds.to_crop(image.width(), image.height());
            tracing::debug!(?bounds, %crop, "detected borders");
            crop
        }
        None => {
            tracing::debug!("empty image, using full crop");
            CropArea::FULL
        }
    }
}
