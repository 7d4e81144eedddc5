//! Codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers the only two places the pipeline touches
//! encoded bytes: decoding an upload and encoding a finished raster. All
//! pixel work in between is backend-independent and operates on
//! [`image::RgbaImage`] buffers.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Source bytes could not be decoded into a bitmap.
    #[error("Failed to load image: {0}")]
    LoadError(String),
    /// A drawing surface of the requested size could not be set up.
    #[error("No render context: {0}")]
    NoRenderContext(String),
    /// The finished raster could not be serialized.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Invalid crop area: {0}")]
    InvalidCrop(String),
}

/// Trait for codec backends.
///
/// `Sync` so a single backend can be shared across a rayon fan-out.
pub trait ImageBackend: Sync {
    /// Decode any supported raster format into straight-alpha RGBA8.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError>;

    /// Losslessly encode a raster as PNG.
    fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>, BackendError>;
}
