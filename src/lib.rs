//! # Shotframe
//!
//! Turns one app screenshot into store-ready marketing images for every
//! phone, tablet and laptop size an app store asks for.
//!
//! # Architecture: Normalize Once, Render Many
//!
//! ```text
//! 1. Decode     upload bytes   →  RGBA bitmap          (imaging::backend)
//! 2. Normalize  bitmap         →  MasterImage          (borders + platform inset, once per upload)
//! 3. Edit       MasterImage    +  EditState            (crop, tone, fit, mode; mutable)
//! 4. Capture    master + edit  →  one PNG per device   (parallel, all or nothing)
//! 5. Export     tray           →  files + manifest     (export-manifest.json)
//! ```
//!
//! The master image is never mutated after step 2. Every preview and every
//! captured variant is rendered fresh from it, so edits never compound and
//! a crop means the same thing on every device.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`devices`] | Closed registry of store screenshot targets and chassis swatches |
//! | [`types`] | Value types: crop, adjustments, fit and export modes, colors |
//! | [`imaging`] | Border detection, normalization, compositor, chassis, filters, codecs |
//! | [`capture`] | Parallel per-device fan-out of one capture event |
//! | [`session`] | Editing session (live state) and export tray (captured variants) |
//! | [`naming`] | `{platform}_{device}_{size}_{mode}_{index}.png` filename contract |
//! | [`export`] | Writes tray contents and a SHA-256 manifest to disk |
//! | [`scan`] | Screenshot discovery for batch runs |
//! | [`config`] | `shotframe.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Immutability Instead of Locks
//!
//! Renders for the devices of one capture run concurrently on the rayon
//! pool. They share a read-only [`imaging::MasterImage`] (an `Arc`) and get
//! the edit state by value; each allocates its own canvas. There is no
//! shared mutable state to guard.
//!
//! ## One Render Path
//!
//! Live previews call the same [`imaging::render_raster`] the exporter
//! uses. What you preview is byte-for-byte what you export.
//!
//! ## Deterministic Pixels
//!
//! Each render draws through its own single-threaded `vello_cpu` context.
//! The same master, edit state and device always produce the same PNG,
//! regardless of how many renders run side by side.

pub mod capture;
pub mod config;
pub mod devices;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod scan;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
