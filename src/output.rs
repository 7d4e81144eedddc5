//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Devices
//!
//! ```text
//! Apple
//! 001 iPhone 6.7" (1290×2796, 19.5:9)
//!     Id: iphone-67
//!     File: apple_phone_6.7_{rect|mockup}_NN.png
//! ...
//!     Chassis: Black Titanium #1c1c1e (default), Natural Titanium #8a857e, ...
//! ```
//!
//! ## Detect
//!
//! ```text
//! home.png (1290×2796)
//!     Detected: x=0.00% y=3.00% w=100.00% h=94.00%
//!     Applied: x=4.00% y=6.76% w=92.00% h=86.48% (standard view)
//!     Master: 1187×2418
//! ```
//!
//! ## Export
//!
//! ```text
//! home.png
//!     apple_phone_6.7_rect_01.png (1290×2796, 412 KB)
//!     apple_phone_6.5_rect_01.png (1242×2688, 398 KB)
//!     apple_tablet_12.9_rect_01.png (2048×2732, 871 KB)
//!
//! Exported 3 variants to store/
//! ```
//!
//! ## Verify
//!
//! ```text
//!     changed or missing: store/apple_phone_6.5_rect_01.png
//! 1 of 3 files in store/ do not match export-manifest.json
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::devices::{DEVICE_TABLE, DeviceSpec, Platform, chassis_swatches};
use crate::export::{MANIFEST_FILENAME, ManifestEntry};
use crate::imaging::normalize::{NormalizeReport, ViewClass};
use crate::naming;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count, in whole KB above 1 KB.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

fn platform_title(platform: Platform) -> &'static str {
    match platform {
        Platform::Apple => "Apple",
        Platform::Android => "Android",
    }
}

/// Filename pattern for a spec, with the mode and index left open.
fn filename_pattern(spec: &DeviceSpec) -> String {
    format!("{}_{{rect|mockup}}_NN.png", naming::variant_stem(spec))
}

// ============================================================================
// Devices
// ============================================================================

/// Format the device registry, optionally for one platform only.
pub fn format_devices(platform: Option<Platform>) -> Vec<String> {
    let mut lines = Vec::new();
    for p in Platform::ALL {
        if platform.is_some_and(|only| only != p) {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(platform_title(p).to_string());

        let specs = DEVICE_TABLE.iter().filter(|s| s.platform == p);
        for (i, spec) in specs.enumerate() {
            lines.push(format!(
                "{} {} ({}×{}, {})",
                format_index(i + 1),
                spec.label,
                spec.width,
                spec.height,
                spec.aspect_label
            ));
            lines.push(format!("{}Id: {}", indent(1), spec.id));
            lines.push(format!("{}File: {}", indent(1), filename_pattern(spec)));
        }

        let swatches: Vec<String> = chassis_swatches(p)
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 0 {
                    format!("{} {} (default)", s.name, s.color)
                } else {
                    format!("{} {}", s.name, s.color)
                }
            })
            .collect();
        lines.push(format!("{}Chassis: {}", indent(1), swatches.join(", ")));
    }
    lines
}

pub fn print_devices(platform: Option<Platform>) {
    for line in format_devices(platform) {
        println!("{}", line);
    }
}

// ============================================================================
// Detect
// ============================================================================

/// Format what normalization found and did for one upload.
pub fn format_detect_report(
    source: &Path,
    report: &NormalizeReport,
    master_size: (u32, u32),
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}×{})",
        source.display(),
        report.source_width,
        report.source_height
    )];
    lines.push(format!("{}Detected: {}", indent(1), report.detected));
    let applied = match report.view_class {
        Some(ViewClass::Standard) => format!("{} (standard view)", report.applied),
        Some(ViewClass::Modal) => format!("{} (modal view)", report.applied),
        None => report.applied.to_string(),
    };
    lines.push(format!("{}Applied: {}", indent(1), applied));
    if report.fell_back {
        lines.push(format!(
            "{}Master: {}×{} (normalization failed, using upload as-is)",
            indent(1),
            master_size.0,
            master_size.1
        ));
    } else {
        lines.push(format!(
            "{}Master: {}×{}",
            indent(1),
            master_size.0,
            master_size.1
        ));
    }
    lines
}

pub fn print_detect_report(source: &Path, report: &NormalizeReport, master_size: (u32, u32)) {
    for line in format_detect_report(source, report, master_size) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format the variants produced from one source screenshot.
pub fn format_capture_output(source: &Path, entries: &[&ManifestEntry]) -> Vec<String> {
    let mut lines = vec![source.display().to_string()];
    for entry in entries {
        lines.push(format!(
            "{}{} ({}×{}, {})",
            indent(1),
            entry.filename,
            entry.width,
            entry.height,
            format_size(entry.bytes)
        ));
    }
    lines
}

pub fn print_capture_output(source: &Path, entries: &[&ManifestEntry]) {
    for line in format_capture_output(source, entries) {
        println!("{}", line);
    }
}

/// Closing summary line of an export run.
pub fn format_export_summary(count: usize, dir: &Path, failed: usize) -> Vec<String> {
    let noun = if count == 1 { "variant" } else { "variants" };
    let mut line = format!("Exported {} {} to {}", count, noun, dir.display());
    if failed > 0 {
        line.push_str(&format!(" ({} screenshots failed)", failed));
    }
    vec![String::new(), line]
}

pub fn print_export_summary(count: usize, dir: &Path, failed: usize) {
    for line in format_export_summary(count, dir, failed) {
        println!("{}", line);
    }
}

// ============================================================================
// Verify
// ============================================================================

/// Outcome of checking an export directory against its manifest.
pub fn format_verify_report(dir: &Path, total: usize, mismatched: &[PathBuf]) -> Vec<String> {
    if mismatched.is_empty() {
        return vec![format!(
            "All {} files in {} match {}",
            total,
            dir.display(),
            MANIFEST_FILENAME
        )];
    }
    let mut lines: Vec<String> = mismatched
        .iter()
        .map(|path| format!("{}changed or missing: {}", indent(1), path.display()))
        .collect();
    lines.push(format!(
        "{} of {} files in {} do not match {}",
        mismatched.len(),
        total,
        dir.display(),
        MANIFEST_FILENAME
    ));
    lines
}

pub fn print_verify_report(dir: &Path, total: usize, mismatched: &[PathBuf]) {
    for line in format_verify_report(dir, total, mismatched) {
        println!("{}", line);
    }
}
