//! Pure geometry for the compositor and normalizer.
//!
//! All functions here are pure and testable without any pixels. Every inset
//! is a fraction of the *canvas width*, so portrait and landscape specs of
//! the same device family get visually matching margins.

use crate::devices::{DeviceSpec, Platform};
use crate::types::{CropArea, ExportMode, FitMode};

/// Apple FIT breathing room on every side.
pub const APPLE_FIT_INSET: f64 = 0.04;
/// FRAME content inset for Android tablets.
pub const FRAME_INSET_ANDROID_TABLET: f64 = 0.10;
/// FRAME content inset for every other spec.
pub const FRAME_INSET_STANDARD: f64 = 0.12;

/// Axis-aligned rectangle in canvas or source pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width × height` surface.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Shrink by `d` on every side.
    pub fn inset(&self, d: f64) -> Self {
        Self::new(
            self.x + d,
            self.y + d,
            self.width - 2.0 * d,
            self.height - 2.0 * d,
        )
    }

    /// Grow by `d` on every side.
    pub fn expand(&self, d: f64) -> Self {
        self.inset(-d)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// Content rectangle the source is fitted into.
///
/// Starts as the full canvas. Apple FIT renders get a 4% breathing-room
/// inset; FRAME renders replace the rectangle outright with the bezel inset
/// measured from the full canvas, so the two never compound.
pub fn content_rect(spec: &DeviceSpec, fit: FitMode, mode: ExportMode) -> Rect {
    let canvas = Rect::full(spec.width, spec.height);
    let w = spec.width as f64;

    if mode == ExportMode::Frame {
        let fraction = if spec.is_android_tablet() {
            FRAME_INSET_ANDROID_TABLET
        } else {
            FRAME_INSET_STANDARD
        };
        return canvas.inset(w * fraction);
    }

    if spec.platform == Platform::Apple && fit == FitMode::Fit {
        return canvas.inset(w * APPLE_FIT_INSET);
    }

    canvas
}

/// Resolve a percentage crop against an image's pixel size.
///
/// The result stays fractional: sampling happens at sub-pixel precision so a
/// crop renders identically at any master resolution.
pub fn source_rect(crop: &CropArea, width: u32, height: u32) -> Rect {
    let w = width as f64;
    let h = height as f64;
    Rect::new(
        crop.x / 100.0 * w,
        crop.y / 100.0 * h,
        crop.width / 100.0 * w,
        crop.height / 100.0 * h,
    )
}

/// Integer pixel region of a percentage crop, for 1:1 extraction.
///
/// Both edges are rounded independently so left and right trims stay
/// symmetric. The region is clamped to the image and never empty.
pub fn crop_to_pixels(crop: &CropArea, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let edge = |pct: f64, extent: u32| -> u32 {
        ((pct / 100.0 * extent as f64).round().max(0.0) as u32).min(extent)
    };
    let left = edge(crop.x, width).min(width.saturating_sub(1));
    let top = edge(crop.y, height).min(height.saturating_sub(1));
    let right = edge(crop.x + crop.width, width).max(left + 1).min(width);
    let bottom = edge(crop.y + crop.height, height).max(top + 1).min(height);
    (left, top, right - left, bottom - top)
}

/// Destination rectangle for a source of `source` size inside `target`.
///
/// - `Fit` letterboxes and centers on the shrunk axis.
/// - `Autofit` covers and centers on the overflowing axis, except that an
///   Android tablet fed a relatively narrower source locks to the target's
///   height so UI elements keep the scale they have on the phone render.
/// - `Stretch` returns `target` unchanged.
pub fn fit_destination(source: &Rect, target: &Rect, fit: FitMode, spec: &DeviceSpec) -> Rect {
    let img_ratio = source.aspect();
    let target_ratio = target.aspect();

    match fit {
        FitMode::Stretch => *target,
        FitMode::Fit => {
            if img_ratio > target_ratio {
                width_locked(img_ratio, target)
            } else {
                height_locked(img_ratio, target)
            }
        }
        FitMode::Autofit => {
            if spec.is_android_tablet() && img_ratio < target_ratio {
                height_locked(img_ratio, target)
            } else if img_ratio > target_ratio {
                height_locked(img_ratio, target)
            } else {
                width_locked(img_ratio, target)
            }
        }
    }
}

/// Full target width, height from the source ratio, centered vertically.
fn width_locked(img_ratio: f64, target: &Rect) -> Rect {
    let draw_h = target.width / img_ratio;
    Rect::new(
        target.x,
        target.y + (target.height - draw_h) / 2.0,
        target.width,
        draw_h,
    )
}

/// Full target height, width from the source ratio, centered horizontally.
fn height_locked(img_ratio: f64, target: &Rect) -> Rect {
    let draw_w = target.height * img_ratio;
    Rect::new(
        target.x + (target.width - draw_w) / 2.0,
        target.y,
        draw_w,
        target.height,
    )
}
