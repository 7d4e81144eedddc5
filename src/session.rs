//! Editing session and export tray.
//!
//! The two halves of the editor's lifecycle are separate types:
//!
//! - [`EditingSession`] owns the immutable [`MasterImage`] of the current
//!   upload plus the live, mutable [`EditState`]. Previews and captures both
//!   go through the compositor, so a preview is exactly what gets exported.
//! - [`ExportTray`] holds captured [`TrayItem`]s. Items are immutable: later
//!   edits never reach them, and discarding one hands its variant back to the
//!   caller to release.

use crate::capture::{CaptureError, CaptureEvent, RenderedVariant, capture};
use crate::devices::{DeviceId, DeviceSpec, Platform};
use crate::imaging::backend::{BackendError, ImageBackend};
use crate::imaging::compositor::{RenderRequest, render_raster};
use crate::imaging::normalize::{MasterImage, NormalizeReport, Normalized, establish_master};
use crate::naming::variant_filename;
use crate::types::{CropArea, ExportMode, FitMode, ImageAdjustments, Rgb};
use image::RgbaImage;
use std::collections::BTreeMap;
use thiserror::Error;

/// The editor's live settings. Copied by value into every render.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditState {
    pub crop: CropArea,
    pub adjustments: ImageAdjustments,
    pub fit: FitMode,
    pub mode: ExportMode,
    /// `None` draws the platform's default chassis swatch.
    pub chassis_color: Option<Rgb>,
}

impl EditState {
    pub fn request_for(&self, spec: &DeviceSpec) -> RenderRequest {
        RenderRequest {
            spec: *spec,
            fit: self.fit,
            mode: self.mode,
            adjustments: self.adjustments,
            crop: self.crop,
            chassis_color: self.chassis_color,
        }
    }
}

/// One upload being edited.
#[derive(Debug, Clone)]
pub struct EditingSession {
    master: MasterImage,
    platform: Platform,
    report: NormalizeReport,
    pub edit: EditState,
}

impl EditingSession {
    /// Decode an upload, establish its master, and start with a full crop.
    pub fn open(
        backend: &impl ImageBackend,
        bytes: &[u8],
        platform: Platform,
        edit: EditState,
    ) -> Result<Self, BackendError> {
        let source = backend.decode(bytes)?;
        Ok(Self::from_image(source, platform, edit))
    }

    /// Start a session from already decoded pixels.
    pub fn from_image(source: RgbaImage, platform: Platform, edit: EditState) -> Self {
        let Normalized { master, report } = establish_master(source, platform);
        Self {
            master,
            platform,
            report,
            // Crops are relative to the new master.
            edit: EditState {
                crop: CropArea::FULL,
                ..edit
            },
        }
    }

    pub fn master(&self) -> &MasterImage {
        &self.master
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    /// Set the crop, rejecting invalid areas without touching the current one.
    pub fn set_crop(&mut self, crop: CropArea) -> Result<(), BackendError> {
        crop.validate()?;
        self.edit.crop = crop;
        Ok(())
    }

    pub fn reset_crop(&mut self) {
        self.edit.crop = CropArea::FULL;
    }

    /// Live preview for one spec, identical to what a capture would export.
    pub fn preview(&self, spec: &DeviceSpec) -> Result<RgbaImage, BackendError> {
        render_raster(&self.master, &self.edit.request_for(spec))
    }

    /// Render every spec of the session's platform with the current edits.
    pub fn capture(&self, backend: &impl ImageBackend) -> Result<CaptureEvent, CaptureError> {
        capture(backend, &self.master, self.platform, &self.edit)
    }
}

/// Stable handle for a tray item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrayItemId(u64);

/// A captured variant waiting for export.
#[derive(Debug, Clone, PartialEq)]
pub struct TrayItem {
    pub id: TrayItemId,
    pub filename: String,
    pub platform: Platform,
    pub mode: ExportMode,
    pub variant: RenderedVariant,
}

#[derive(Error, Debug, PartialEq)]
pub enum TrayError {
    #[error("no tray item {0:?}")]
    UnknownItem(TrayItemId),
    #[error("replacement renders {found}, item holds {expected}")]
    DeviceMismatch { expected: DeviceId, found: DeviceId },
}

/// Ordered collection of captured variants.
#[derive(Debug, Default)]
pub struct ExportTray {
    items: Vec<TrayItem>,
    /// Captures committed so far per (platform, mode) bucket.
    captures: BTreeMap<(Platform, ExportMode), u32>,
    next_id: u64,
}

impl ExportTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every variant of a capture, naming each with the bucket's next index.
    pub fn commit(&mut self, event: CaptureEvent) -> Vec<TrayItemId> {
        let counter = self.captures.entry((event.platform, event.mode)).or_insert(0);
        *counter += 1;
        let index = *counter;

        let mut ids = Vec::with_capacity(event.variants.len());
        for variant in event.variants {
            let id = TrayItemId(self.next_id);
            self.next_id += 1;
            let filename = variant_filename(variant.spec(), event.mode, index);
            tracing::debug!(%filename, "added to tray");
            self.items.push(TrayItem {
                id,
                filename,
                platform: event.platform,
                mode: event.mode,
                variant,
            });
            ids.push(id);
        }
        ids
    }

    pub fn get(&self, id: TrayItemId) -> Option<&TrayItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Take an item out of the tray. Its index is not reused.
    pub fn remove(&mut self, id: TrayItemId) -> Option<TrayItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Swap in a new render of the same device, returning the old variant.
    pub fn replace(
        &mut self,
        id: TrayItemId,
        variant: RenderedVariant,
    ) -> Result<RenderedVariant, TrayError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(TrayError::UnknownItem(id))?;
        if item.variant.device != variant.device {
            return Err(TrayError::DeviceMismatch {
                expected: item.variant.device,
                found: variant.device,
            });
        }
        Ok(std::mem::replace(&mut item.variant, variant))
    }

    /// Empty the tray and restart every bucket's numbering.
    pub fn clear(&mut self) -> Vec<TrayItem> {
        self.captures.clear();
        std::mem::take(&mut self.items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrayItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::render_variant;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{banded_screenshot, gradient, small_spec};
    use std::sync::Arc;

    fn variant(device: DeviceId, marker: u8) -> RenderedVariant {
        let spec = device.spec();
        RenderedVariant {
            device,
            width: spec.width,
            height: spec.height,
            png: Arc::from(vec![marker]),
        }
    }

    fn event(platform: Platform, mode: ExportMode) -> CaptureEvent {
        CaptureEvent {
            platform,
            mode,
            variants: crate::devices::specs_for(platform)
                .iter()
                .map(|s| variant(s.id, 0))
                .collect(),
        }
    }

    // =========================================================================
    // EditingSession
    // =========================================================================

    #[test]
    fn open_normalizes_and_resets_crop() {
        let backend = MockBackend::with_image(banded_screenshot(60, 120, 10, 10));
        let edit = EditState {
            crop: CropArea::new(10.0, 10.0, 50.0, 50.0).unwrap(),
            fit: FitMode::Autofit,
            ..EditState::default()
        };
        let session = EditingSession::open(&backend, b"png", Platform::Android, edit).unwrap();
        assert_eq!(session.edit.crop, CropArea::FULL);
        assert_eq!(session.edit.fit, FitMode::Autofit);
        assert_eq!(session.master().height(), 100);
        assert!(!session.report().fell_back);
    }

    #[test]
    fn open_propagates_decode_failure() {
        let backend = MockBackend::new();
        let err = EditingSession::open(&backend, b"junk", Platform::Apple, EditState::default())
            .unwrap_err();
        assert!(matches!(err, BackendError::LoadError(_)));
    }

    #[test]
    fn set_crop_rejects_invalid_and_keeps_previous() {
        let mut session =
            EditingSession::from_image(gradient(20, 40), Platform::Android, EditState::default());
        let good = CropArea::new(0.0, 0.0, 50.0, 50.0).unwrap();
        session.set_crop(good).unwrap();
        let bad = CropArea {
            x: 80.0,
            y: 0.0,
            width: 40.0,
            height: 10.0,
        };
        assert!(session.set_crop(bad).is_err());
        assert_eq!(session.edit.crop, good);
        session.reset_crop();
        assert!(session.edit.crop.is_full());
    }

    #[test]
    fn preview_matches_exported_variant() {
        let session =
            EditingSession::from_image(gradient(30, 60), Platform::Android, EditState::default());
        let spec = small_spec(DeviceId::AndroidPhone, 30, 60);
        let preview = session.preview(&spec).unwrap();

        let backend = MockBackend::new();
        let exported = render_variant(&backend, session.master(), &spec, &session.edit).unwrap();
        // Mock encoder emits the raw RGBA buffer
        assert_eq!(&exported.png[..], preview.as_raw().as_slice());
    }

    #[test]
    fn edits_after_capture_do_not_reach_tray_items() {
        let backend = MockBackend::new();
        let mut session =
            EditingSession::from_image(gradient(20, 40), Platform::Apple, EditState::default());
        let mut tray = ExportTray::new();
        let ids = tray.commit(session.capture(&backend).unwrap());
        let before = tray.get(ids[0]).unwrap().variant.png.clone();

        session.edit.adjustments.brightness = 40.0;
        session.set_crop(CropArea::new(0.0, 0.0, 10.0, 10.0).unwrap()).unwrap();
        session.capture(&backend).unwrap();

        assert_eq!(tray.get(ids[0]).unwrap().variant.png, before);
    }

    // =========================================================================
    // ExportTray
    // =========================================================================

    #[test]
    fn commit_names_variants_with_bucket_index() {
        let mut tray = ExportTray::new();
        tray.commit(event(Platform::Apple, ExportMode::Rectangle));
        tray.commit(event(Platform::Apple, ExportMode::Rectangle));
        tray.commit(event(Platform::Apple, ExportMode::Frame));
        tray.commit(event(Platform::Android, ExportMode::Rectangle));

        let names: Vec<&str> = tray.iter().map(|i| i.filename.as_str()).collect();
        assert!(names.contains(&"apple_phone_6.7_rect_01.png"));
        assert!(names.contains(&"apple_phone_6.7_rect_02.png"));
        assert!(names.contains(&"apple_tablet_12.9_mockup_01.png"));
        assert!(names.contains(&"android_phone_rect_01.png"));
        assert_eq!(tray.len(), 3 + 3 + 3 + 4);
    }

    #[test]
    fn removed_indices_are_not_reused() {
        let mut tray = ExportTray::new();
        let first = tray.commit(event(Platform::Android, ExportMode::Frame));
        for id in first {
            tray.remove(id).unwrap();
        }
        assert!(tray.is_empty());
        tray.commit(event(Platform::Android, ExportMode::Frame));
        assert!(tray.iter().all(|i| i.filename.ends_with("_02.png")));
    }

    #[test]
    fn remove_hands_back_the_item() {
        let mut tray = ExportTray::new();
        let ids = tray.commit(event(Platform::Apple, ExportMode::Rectangle));
        let removed = tray.remove(ids[1]).unwrap();
        assert_eq!(removed.variant.device, DeviceId::Iphone65);
        assert!(tray.get(ids[1]).is_none());
        assert!(tray.remove(ids[1]).is_none());
    }

    #[test]
    fn replace_swaps_variant_and_keeps_filename() {
        let mut tray = ExportTray::new();
        let ids = tray.commit(event(Platform::Apple, ExportMode::Rectangle));
        let name = tray.get(ids[0]).unwrap().filename.clone();

        let old = tray.replace(ids[0], variant(DeviceId::Iphone67, 9)).unwrap();
        assert_eq!(&old.png[..], &[0]);
        let item = tray.get(ids[0]).unwrap();
        assert_eq!(&item.variant.png[..], &[9]);
        assert_eq!(item.filename, name);
    }

    #[test]
    fn replace_rejects_other_device_and_unknown_id() {
        let mut tray = ExportTray::new();
        let ids = tray.commit(event(Platform::Apple, ExportMode::Rectangle));
        assert_eq!(
            tray.replace(ids[0], variant(DeviceId::Ipad129, 1)),
            Err(TrayError::DeviceMismatch {
                expected: DeviceId::Iphone67,
                found: DeviceId::Ipad129,
            })
        );
        tray.remove(ids[0]);
        assert_eq!(
            tray.replace(ids[0], variant(DeviceId::Iphone67, 1)),
            Err(TrayError::UnknownItem(ids[0]))
        );
    }

    #[test]
    fn clear_returns_items_and_restarts_numbering() {
        let mut tray = ExportTray::new();
        tray.commit(event(Platform::Android, ExportMode::Rectangle));
        tray.commit(event(Platform::Android, ExportMode::Rectangle));
        let released = tray.clear();
        assert_eq!(released.len(), 8);
        assert!(tray.is_empty());

        tray.commit(event(Platform::Android, ExportMode::Rectangle));
        assert!(tray.iter().all(|i| i.filename.ends_with("_01.png")));
    }
}
