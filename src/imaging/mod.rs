//! Image processing: pure Rust, no system libraries.
//!
//! | Stage | Module / function |
//! |---|---|
//! | **Decode / encode** | [`ImageBackend`] → [`RustBackend`] (`image` crate) |
//! | **Border detection** | [`borders::detect_borders`] |
//! | **Normalization** | [`normalize::establish_master`] → [`MasterImage`] |
//! | **Composition** | [`compositor::render`] (chassis, tone filter, sharpen) |
//!
//! The module is split into:
//! - **Calculations**: pure rectangle math (unit testable without pixels)
//! - **Raster**: `vello_cpu` drawing surface, paths and image paints
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Pipeline stages**: borders, normalize, chassis, filters, compositor

pub mod backend;
pub mod borders;
pub mod calculations;
pub mod chassis;
pub mod compositor;
pub mod filters;
pub mod normalize;
pub mod raster;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use borders::detect_borders;
pub use compositor::{RenderRequest, render, render_raster};
pub use normalize::{MasterImage, Normalized, establish_master};
pub use rust_backend::RustBackend;
