//! Filename convention for exported variants.
//!
//! ```text
//! {platform}_{device}_{size}_{mode}_{index}.png
//!
//! apple_phone_6.7_rect_01.png
//! android_tablet_10in_mockup_03.png
//! android_phone_rect_02.png          (no size label: segment dropped)
//! ```
//!
//! `index` counts captures within one (platform, mode) bucket, starting at 1
//! and zero-padded to two digits. It is assigned by the export tray when a
//! capture is committed; this module only formats and parses.

use crate::devices::{DeviceClass, DeviceSpec, Platform};
use crate::types::ExportMode;

/// Device part of every filename for `spec`: `{platform}_{device}[_{size}]`.
pub fn variant_stem(spec: &DeviceSpec) -> String {
    let mut parts = vec![spec.platform.as_str(), spec.class.as_str()];
    if !spec.size_label.is_empty() {
        parts.push(spec.size_label);
    }
    parts.join("_")
}

/// Filename for one variant of the `index`-th capture in its bucket.
pub fn variant_filename(spec: &DeviceSpec, mode: ExportMode, index: u32) -> String {
    format!("{}_{}_{:02}.png", variant_stem(spec), mode.filename_tag(), index)
}

/// Result of parsing a variant filename like `apple_phone_6.7_rect_01.png`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVariantName {
    pub platform: Platform,
    pub class: DeviceClass,
    /// Empty when the filename carries no size segment.
    pub size_label: String,
    pub mode: ExportMode,
    pub index: u32,
}

/// Parse a filename produced by [`variant_filename`]. Returns `None` for
/// anything that doesn't follow the convention.
pub fn parse_variant_filename(name: &str) -> Option<ParsedVariantName> {
    let stem = name.strip_suffix(".png")?;
    let parts: Vec<&str> = stem.split('_').collect();
    let (platform, class, size, mode, index) = match parts.as_slice() {
        [p, c, m, i] => (*p, *c, "", *m, *i),
        [p, c, s, m, i] => (*p, *c, *s, *m, *i),
        _ => return None,
    };

    let platform = Platform::ALL.into_iter().find(|p| p.as_str() == platform)?;
    let class = [DeviceClass::Phone, DeviceClass::Tablet, DeviceClass::Chromebook]
        .into_iter()
        .find(|c| c.as_str() == class)?;
    let mode = [ExportMode::Rectangle, ExportMode::Frame]
        .into_iter()
        .find(|m| m.filename_tag() == mode)?;
    if index.len() < 2 || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(ParsedVariantName {
        platform,
        class,
        size_label: size.to_string(),
        mode,
        index: index.parse().ok()?,
    })
}
