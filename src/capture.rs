//! Capture events: one render per device of an ecosystem, all or nothing.
//!
//! A capture fans out a compositor call for every spec returned by
//! [`specs_for`], in parallel on the rayon pool. Each render gets its own
//! canvas and reads the shared [`MasterImage`] and a by-value copy of the
//! edit state, so there is nothing to lock.
//!
//! Every render runs to completion before results are inspected. If any of
//! them failed the capture as a whole fails with the first error in
//! registry order, and no variant is handed back.

use crate::devices::{DeviceId, DeviceSpec, Platform, specs_for};
use crate::imaging::backend::{BackendError, ImageBackend};
use crate::imaging::compositor::render;
use crate::imaging::normalize::MasterImage;
use crate::session::EditState;
use crate::types::ExportMode;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;

/// One render of one device spec. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVariant {
    pub device: DeviceId,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG. Shared so tray and export can hold it without copying.
    pub png: Arc<[u8]>,
}

impl RenderedVariant {
    pub fn spec(&self) -> &'static DeviceSpec {
        self.device.spec()
    }
}

/// Every variant of a single capture.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub platform: Platform,
    pub mode: ExportMode,
    pub variants: Vec<RenderedVariant>,
}

#[derive(Error, Debug)]
#[error("render for {device} failed: {source}")]
pub struct CaptureError {
    pub device: DeviceId,
    #[source]
    pub source: BackendError,
}

/// Render a single spec with the given edit state.
pub fn render_variant(
    backend: &impl ImageBackend,
    master: &MasterImage,
    spec: &DeviceSpec,
    edit: &EditState,
) -> Result<RenderedVariant, CaptureError> {
    let request = edit.request_for(spec);
    let png = render(backend, master, &request).map_err(|source| CaptureError {
        device: spec.id,
        source,
    })?;
    Ok(RenderedVariant {
        device: spec.id,
        width: spec.width,
        height: spec.height,
        png: png.into(),
    })
}

/// Render every spec of `platform` concurrently.
#[tracing::instrument(skip(backend, master, edit), fields(mode = edit.mode.as_str(), fit = edit.fit.as_str()))]
pub fn capture(
    backend: &impl ImageBackend,
    master: &MasterImage,
    platform: Platform,
    edit: &EditState,
) -> Result<CaptureEvent, CaptureError> {
    let specs = specs_for(platform);
    let edit = *edit;

    let rendered: Vec<Result<RenderedVariant, CaptureError>> = specs
        .par_iter()
        .map(|spec| render_variant(backend, master, spec, &edit))
        .collect();

    let mut variants = Vec::with_capacity(rendered.len());
    for result in rendered {
        match result {
            Ok(variant) => variants.push(variant),
            Err(e) => {
                tracing::warn!(device = %e.device, error = %e.source, "capture failed");
                return Err(e);
            }
        }
    }

    tracing::debug!(count = variants.len(), "capture complete");
    Ok(CaptureEvent {
        platform,
        mode: edit.mode,
        variants,
    })
}
