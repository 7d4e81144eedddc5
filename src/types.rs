//! Value types shared by the editor, the compositor and the export tray.
//!
//! All of these are plain `Copy` values. The compositor receives them by
//! value, so concurrent renders never share mutable state.

use crate::imaging::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-rectangle of the current image, in percent of its dimensions.
///
/// Percentages keep a crop resolution-independent: the same value can be
/// re-applied to any re-rendered buffer of the same logical image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropArea {
    /// The whole image.
    pub const FULL: CropArea = CropArea {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    /// Build a crop, rejecting values outside `[0,100]`, empty extents, and
    /// rectangles that spill past the right or bottom edge.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, BackendError> {
        let crop = Self {
            x,
            y,
            width,
            height,
        };
        crop.validate()?;
        Ok(crop)
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        let fields = [self.x, self.y, self.width, self.height];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0 || *v > 100.0) {
            return Err(BackendError::InvalidCrop(format!(
                "values must be within 0-100: {self}"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(BackendError::InvalidCrop(format!(
                "width and height must be positive: {self}"
            )));
        }
        // Tolerate float noise from percentage round trips.
        if self.x + self.width > 100.0 + 1e-9 || self.y + self.height > 100.0 + 1e-9 {
            return Err(BackendError::InvalidCrop(format!(
                "crop extends past the image: {self}"
            )));
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for CropArea {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for CropArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.2}% y={:.2}% w={:.2}% h={:.2}%",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Global tonal adjustments.
///
/// Brightness, contrast and saturation are percentages where 100 leaves the
/// image unchanged. Sharpness runs from 0 to 100; 0 skips the sharpening
/// pass entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageAdjustments {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub sharpness: f64,
}

impl ImageAdjustments {
    pub const NEUTRAL: ImageAdjustments = ImageAdjustments {
        brightness: 100.0,
        contrast: 100.0,
        saturation: 100.0,
        sharpness: 0.0,
    };

    /// True when brightness, contrast and saturation are all 100.
    pub fn is_tonally_neutral(&self) -> bool {
        self.brightness == 100.0 && self.contrast == 100.0 && self.saturation == 100.0
    }
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// How a cropped source maps into the content rectangle when aspect ratios differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Letterbox: the whole source stays visible.
    #[default]
    Fit,
    /// Force both dimensions to the content rectangle.
    Stretch,
    /// Cover the content rectangle, cropping overflow.
    Autofit,
}

impl FitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Fit => "fit",
            FitMode::Stretch => "stretch",
            FitMode::Autofit => "autofit",
        }
    }
}

/// Whether a device chassis is drawn around the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    #[default]
    Rectangle,
    Frame,
}

impl ExportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportMode::Rectangle => "rectangle",
            ExportMode::Frame => "frame",
        }
    }

    /// Mode segment used in output filenames.
    pub fn filename_tag(self) -> &'static str {
        match self {
            ExportMode::Rectangle => "rect",
            ExportMode::Frame => "mockup",
        }
    }
}

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}', expected #rrggbb")))
    }
}
