//! Shared test utilities for the shotframe test suite.
//!
//! Synthetic screenshots built from closed-form pixel functions, so tests
//! never depend on fixture files, plus small device specs that keep renders
//! fast in debug builds.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let shot = banded_screenshot(120, 240, 12, 12);
//! let spec = small_spec(DeviceId::Iphone67, 60, 130);
//! let master = MasterImage::new(shot);
//! ```

use crate::devices::{DeviceId, DeviceSpec};
use image::{Rgba, RgbaImage};

/// Border color used by [`banded_screenshot`].
pub const BAND_COLOR: [u8; 4] = [12, 12, 14, 255];

// =========================================================================
// Synthetic images
// =========================================================================

/// A single-color image.
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// A non-uniform opaque image: red ramps across, green ramps down.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
            (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
            96,
            255,
        ])
    })
}

/// A checkerboard of `cell`-pixel squares in two high-contrast colors.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Rgba([240, 240, 240, 255])
        } else {
            Rgba([20, 40, 200, 255])
        }
    })
}

/// A screenshot with `top` and `bottom` rows of [`BAND_COLOR`] around
/// checkerboard content, like a status bar and home-indicator strip.
pub fn banded_screenshot(width: u32, height: u32, top: u32, bottom: u32) -> RgbaImage {
    let content = checkerboard(width, height, 4);
    RgbaImage::from_fn(width, height, |x, y| {
        if y < top || y >= height - bottom {
            Rgba(BAND_COLOR)
        } else {
            *content.get_pixel(x, y)
        }
    })
}

// =========================================================================
// Specs
// =========================================================================

/// A registry spec shrunk to `width × height`, keeping its platform and classing.
pub fn small_spec(id: DeviceId, width: u32, height: u32) -> DeviceSpec {
    DeviceSpec {
        width,
        height,
        ..*id.spec()
    }
}

// =========================================================================
// Pixel assertions
// =========================================================================

/// Number of pixels that differ between two equally sized images.
pub fn count_differing_pixels(a: &RgbaImage, b: &RgbaImage) -> usize {
    assert_eq!(a.dimensions(), b.dimensions(), "image size mismatch");
    a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
}

/// Number of differing pixels, ignoring the outermost one-pixel ring.
pub fn count_differing_interior_pixels(a: &RgbaImage, b: &RgbaImage) -> usize {
    assert_eq!(a.dimensions(), b.dimensions(), "image size mismatch");
    let (w, h) = a.dimensions();
    let mut n = 0;
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if a.get_pixel(x, y) != b.get_pixel(x, y) {
                n += 1;
            }
        }
    }
    n
}

/// Assert that every pixel on the one-pixel border ring is identical.
pub fn assert_ring_unchanged(a: &RgbaImage, b: &RgbaImage) {
    let (w, h) = a.dimensions();
    for x in 0..w {
        for y in [0, h - 1] {
            assert_eq!(a.get_pixel(x, y), b.get_pixel(x, y), "ring pixel ({x},{y}) changed");
        }
    }
    for y in 0..h {
        for x in [0, w - 1] {
            assert_eq!(a.get_pixel(x, y), b.get_pixel(x, y), "ring pixel ({x},{y}) changed");
        }
    }
}
