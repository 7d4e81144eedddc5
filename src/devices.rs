//! Device spec registry.
//!
//! A closed set of store screenshot targets. Every row is configuration data:
//! pixel dimensions, ecosystem, and the classing flags the compositor keys its
//! policies on. Adding a device means adding a [`DeviceId`] variant and a row
//! in [`DEVICE_TABLE`]; nothing in the compositor changes.
//!
//! | Device | Platform | Pixels | Class |
//! |---|---|---|---|
//! | Android phone | Android | 1080×1920 | phone |
//! | 7" tablet | Android | 1920×1200 | tablet |
//! | 10" tablet | Android | 2560×1600 | tablet |
//! | Chromebook | Android | 1920×1080 | chromebook |
//! | iPhone 6.7" | Apple | 1290×2796 | phone |
//! | iPhone 6.5" | Apple | 1242×2688 | phone |
//! | iPad 12.9" | Apple | 2048×2732 | tablet |

use crate::types::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store ecosystem a device belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apple,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Apple, Platform::Android];

    /// Lowercase tag used in filenames and config.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Apple => "apple",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad hardware class, used for output filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Phone,
    Tablet,
    Chromebook,
}

impl DeviceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Phone => "phone",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Chromebook => "chromebook",
        }
    }
}

/// Lookup key for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceId {
    #[serde(rename = "android-phone")]
    AndroidPhone,
    #[serde(rename = "android-tablet-7")]
    AndroidTablet7,
    #[serde(rename = "android-tablet-10")]
    AndroidTablet10,
    #[serde(rename = "chromebook")]
    Chromebook,
    #[serde(rename = "iphone-67")]
    Iphone67,
    #[serde(rename = "iphone-65")]
    Iphone65,
    #[serde(rename = "ipad-129")]
    Ipad129,
}

impl DeviceId {
    pub const ALL: [DeviceId; 7] = [
        DeviceId::AndroidPhone,
        DeviceId::AndroidTablet7,
        DeviceId::AndroidTablet10,
        DeviceId::Chromebook,
        DeviceId::Iphone67,
        DeviceId::Iphone65,
        DeviceId::Ipad129,
    ];

    /// Registry row for this device.
    pub fn spec(self) -> &'static DeviceSpec {
        // Table rows are declared in `ALL` order.
        &DEVICE_TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceId::AndroidPhone => "android-phone",
            DeviceId::AndroidTablet7 => "android-tablet-7",
            DeviceId::AndroidTablet10 => "android-tablet-10",
            DeviceId::Chromebook => "chromebook",
            DeviceId::Iphone67 => "iphone-67",
            DeviceId::Iphone65 => "iphone-65",
            DeviceId::Ipad129 => "ipad-129",
        }
    }

    /// Parse the kebab-case identifier used on the command line.
    pub fn parse(s: &str) -> Option<DeviceId> {
        DeviceId::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions and classing for one store screenshot target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    pub id: DeviceId,
    pub width: u32,
    pub height: u32,
    pub platform: Platform,
    pub label: &'static str,
    pub aspect_label: &'static str,
    pub class: DeviceClass,
    /// Size segment of output filenames (`6.7`, `7in`, ...). Empty when the
    /// store has a single size for the class.
    pub size_label: &'static str,
    pub is_tablet: bool,
}

impl DeviceSpec {
    pub fn is_android_tablet(&self) -> bool {
        self.platform == Platform::Android && self.is_tablet
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

pub static DEVICE_TABLE: [DeviceSpec; 7] = [
    DeviceSpec {
        id: DeviceId::AndroidPhone,
        width: 1080,
        height: 1920,
        platform: Platform::Android,
        label: "Android Phone",
        aspect_label: "9:16",
        class: DeviceClass::Phone,
        size_label: "",
        is_tablet: false,
    },
    DeviceSpec {
        id: DeviceId::AndroidTablet7,
        width: 1920,
        height: 1200,
        platform: Platform::Android,
        label: "7\" Tablet",
        aspect_label: "16:10",
        class: DeviceClass::Tablet,
        size_label: "7in",
        is_tablet: true,
    },
    DeviceSpec {
        id: DeviceId::AndroidTablet10,
        width: 2560,
        height: 1600,
        platform: Platform::Android,
        label: "10\" Tablet",
        aspect_label: "16:10",
        class: DeviceClass::Tablet,
        size_label: "10in",
        is_tablet: true,
    },
    DeviceSpec {
        id: DeviceId::Chromebook,
        width: 1920,
        height: 1080,
        platform: Platform::Android,
        label: "Chromebook",
        aspect_label: "16:9",
        class: DeviceClass::Chromebook,
        size_label: "",
        is_tablet: false,
    },
    DeviceSpec {
        id: DeviceId::Iphone67,
        width: 1290,
        height: 2796,
        platform: Platform::Apple,
        label: "iPhone 6.7\"",
        aspect_label: "19.5:9",
        class: DeviceClass::Phone,
        size_label: "6.7",
        is_tablet: false,
    },
    DeviceSpec {
        id: DeviceId::Iphone65,
        width: 1242,
        height: 2688,
        platform: Platform::Apple,
        label: "iPhone 6.5\"",
        aspect_label: "19.5:9",
        class: DeviceClass::Phone,
        size_label: "6.5",
        is_tablet: false,
    },
    DeviceSpec {
        id: DeviceId::Ipad129,
        width: 2048,
        height: 2732,
        platform: Platform::Apple,
        label: "iPad Pro 12.9\"",
        aspect_label: "3:4",
        class: DeviceClass::Tablet,
        size_label: "12.9",
        is_tablet: true,
    },
];

/// All specs of an ecosystem, in table order.
pub fn specs_for(platform: Platform) -> Vec<&'static DeviceSpec> {
    DEVICE_TABLE
        .iter()
        .filter(|s| s.platform == platform)
        .collect()
}

/// A named chassis color offered for mockup exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChassisSwatch {
    pub name: &'static str,
    pub color: Rgb,
}

const APPLE_SWATCHES: &[ChassisSwatch] = &[
    ChassisSwatch {
        name: "Black Titanium",
        color: Rgb::new(0x1c, 0x1c, 0x1e),
    },
    ChassisSwatch {
        name: "Natural Titanium",
        color: Rgb::new(0x8a, 0x85, 0x7e),
    },
    ChassisSwatch {
        name: "White Titanium",
        color: Rgb::new(0xe3, 0xe1, 0xdc),
    },
    ChassisSwatch {
        name: "Blue Titanium",
        color: Rgb::new(0x3d, 0x45, 0x55),
    },
];

const ANDROID_SWATCHES: &[ChassisSwatch] = &[
    ChassisSwatch {
        name: "Obsidian",
        color: Rgb::new(0x20, 0x21, 0x24),
    },
    ChassisSwatch {
        name: "Porcelain",
        color: Rgb::new(0xe8, 0xe4, 0xdc),
    },
    ChassisSwatch {
        name: "Bay",
        color: Rgb::new(0x8c, 0xb4, 0xd8),
    },
    ChassisSwatch {
        name: "Hazel",
        color: Rgb::new(0x8d, 0x93, 0x86),
    },
];

/// Chassis color swatches for a platform. The first entry is the default.
pub fn chassis_swatches(platform: Platform) -> &'static [ChassisSwatch] {
    match platform {
        Platform::Apple => APPLE_SWATCHES,
        Platform::Android => ANDROID_SWATCHES,
    }
}

pub fn default_chassis_color(platform: Platform) -> Rgb {
    chassis_swatches(platform)[0].color
}

/// Resolve a swatch name (case-insensitive) or a `#rrggbb` value.
pub fn resolve_chassis_color(platform: Platform, value: &str) -> Option<Rgb> {
    chassis_swatches(platform)
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(value.trim()))
        .map(|s| s.color)
        .or_else(|| Rgb::from_hex(value.trim()))
}
