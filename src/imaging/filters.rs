//! Global tone filter and sharpening.
//!
//! The tone filter follows CSS filter semantics, applied in order
//! `brightness → contrast → saturate`, with values clamped to the displayable
//! range after each step. 100% is the identity for all three.
//!
//! Sharpening is a 3×3 cross-shaped unsharp kernel:
//!
//! ```text
//!      0   -a    0
//!     -a  1+4a  -a        a = amount / 300
//!      0   -a    0
//! ```
//!
//! It runs over the whole canvas except the outermost one-pixel ring, which
//! is left as composited. Alpha is never touched.

use crate::types::ImageAdjustments;
use image::RgbaImage;

// Rec. 709 luma weights used by the CSS saturate() matrix.
const LUMA_R: f64 = 0.213;
const LUMA_G: f64 = 0.715;
const LUMA_B: f64 = 0.072;

/// Precomputed brightness/contrast/saturation transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneFilter {
    brightness: f64,
    contrast: f64,
    matrix: [[f64; 3]; 3],
}

impl ToneFilter {
    /// `None` when the adjustments leave every color unchanged.
    pub fn from_adjustments(adj: &ImageAdjustments) -> Option<Self> {
        if adj.is_tonally_neutral() {
            return None;
        }
        let s = (adj.saturation / 100.0).max(0.0);
        Some(Self {
            brightness: (adj.brightness / 100.0).max(0.0),
            contrast: (adj.contrast / 100.0).max(0.0),
            matrix: [
                [LUMA_R + (1.0 - LUMA_R) * s, LUMA_G - LUMA_G * s, LUMA_B - LUMA_B * s],
                [LUMA_R - LUMA_R * s, LUMA_G + (1.0 - LUMA_G) * s, LUMA_B - LUMA_B * s],
                [LUMA_R - LUMA_R * s, LUMA_G - LUMA_G * s, LUMA_B + (1.0 - LUMA_B) * s],
            ],
        })
    }

    /// Apply to an RGB triple on the 0–255 scale.
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        let mut c = rgb.map(|v| v / 255.0);
        c = c.map(|v| (v * self.brightness).clamp(0.0, 1.0));
        c = c.map(|v| ((v - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0));
        let m = &self.matrix;
        let saturated = [
            m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2],
            m[1][0] * c[0] + m[1][1] * c[1] + m[1][2] * c[2],
            m[2][0] * c[0] + m[2][1] * c[1] + m[2][2] * c[2],
        ];
        saturated.map(|v| v.clamp(0.0, 1.0) * 255.0)
    }
}

/// Sharpen the canvas in place. `amount <= 0` is a no-op.
pub fn sharpen(canvas: &mut RgbaImage, amount: f64) {
    if amount <= 0.0 || !amount.is_finite() {
        return;
    }
    let (w, h) = canvas.dimensions();
    if w < 3 || h < 3 {
        return;
    }

    let edge = -amount / 300.0;
    let center = 1.0 + 4.0 * amount / 300.0;
    let src = canvas.clone();
    let stride = w as usize * 4;
    let input = src.as_raw();
    let output: &mut [u8] = canvas;

    for y in 1..(h - 1) as usize {
        for x in 1..(w - 1) as usize {
            let i = y * stride + x * 4;
            for c in 0..3 {
                let v = center * input[i + c] as f64
                    + edge
                        * (input[i - stride + c] as f64
                            + input[i + stride + c] as f64
                            + input[i - 4 + c] as f64
                            + input[i + 4 + c] as f64);
                output[i + c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assert_ring_unchanged, checkerboard, count_differing_interior_pixels, solid};

    fn adj(brightness: f64, contrast: f64, saturation: f64) -> ImageAdjustments {
        ImageAdjustments {
            brightness,
            contrast,
            saturation,
            sharpness: 0.0,
        }
    }

    #[test]
    fn neutral_adjustments_have_no_filter() {
        assert!(ToneFilter::from_adjustments(&ImageAdjustments::NEUTRAL).is_none());
    }

    #[test]
    fn brightness_scales_channels() {
        let f = ToneFilter::from_adjustments(&adj(50.0, 100.0, 100.0)).unwrap();
        let out = f.apply([200.0, 100.0, 0.0]);
        assert!((out[0] - 100.0).abs() < 1e-6);
        assert!((out[1] - 50.0).abs() < 1e-6);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn brightness_clamps_at_white() {
        let f = ToneFilter::from_adjustments(&adj(150.0, 100.0, 100.0)).unwrap();
        assert_eq!(f.apply([250.0, 250.0, 250.0]), [255.0, 255.0, 255.0]);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let f = ToneFilter::from_adjustments(&adj(100.0, 150.0, 100.0)).unwrap();
        let mid = f.apply([127.5, 127.5, 127.5]);
        assert!((mid[0] - 127.5).abs() < 1e-6);
        let dark = f.apply([50.0, 50.0, 50.0]);
        assert!(dark[0] < 50.0);
    }

    #[test]
    fn zero_saturation_is_grayscale() {
        let f = ToneFilter::from_adjustments(&adj(100.0, 100.0, 0.0)).unwrap();
        let out = f.apply([255.0, 0.0, 0.0]);
        assert!((out[0] - out[1]).abs() < 1e-6);
        assert!((out[1] - out[2]).abs() < 1e-6);
    }

    #[test]
    fn saturation_preserves_gray() {
        let f = ToneFilter::from_adjustments(&adj(100.0, 100.0, 150.0)).unwrap();
        let out = f.apply([80.0, 80.0, 80.0]);
        for v in out {
            assert!((v - 80.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sharpen_zero_is_noop() {
        let mut img = checkerboard(12, 12, 3);
        let before = img.clone();
        sharpen(&mut img, 0.0);
        assert_eq!(img, before);
    }

    #[test]
    fn sharpen_changes_interior_only() {
        let mut img = checkerboard(12, 12, 3);
        let before = img.clone();
        sharpen(&mut img, 60.0);
        assert!(count_differing_interior_pixels(&img, &before) > 0);
        assert_ring_unchanged(&img, &before);
    }

    #[test]
    fn sharpen_leaves_uniform_image_alone() {
        let mut img = solid(8, 8, [90, 120, 30, 255]);
        let before = img.clone();
        sharpen(&mut img, 100.0);
        assert_eq!(img, before);
    }

    #[test]
    fn sharpen_preserves_alpha() {
        let mut img = checkerboard(8, 8, 2);
        for (i, p) in img.pixels_mut().enumerate() {
            p[3] = (i * 3 % 256) as u8;
        }
        let alphas: Vec<u8> = img.pixels().map(|p| p[3]).collect();
        sharpen(&mut img, 100.0);
        let after: Vec<u8> = img.pixels().map(|p| p[3]).collect();
        assert_eq!(alphas, after);
    }

    #[test]
    fn sharpen_tiny_canvas_is_noop() {
        let mut img = checkerboard(2, 5, 1);
        let before = img.clone();
        sharpen(&mut img, 100.0);
        assert_eq!(img, before);
    }
}
