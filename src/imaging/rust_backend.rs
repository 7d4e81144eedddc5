//! Pure Rust codec backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (fast deflate, adaptive filter) |

use super::backend::{BackendError, ImageBackend};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const SCREENSHOT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SCREENSHOT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True when the path's extension names a decodable screenshot format.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError> {
        let img = reader(bytes)?
            .decode()
            .map_err(|e| BackendError::LoadError(format!("Failed to decode: {}", e)))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(BackendError::LoadError("Decoded image is empty".into()));
        }
        Ok(img.to_rgba8())
    }

    fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>, BackendError> {
        let mut out = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::Adaptive);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
        if out.is_empty() {
            return Err(BackendError::ProcessingFailed(
                "PNG encoder produced no output".into(),
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        })
    }

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["png", "jpg", "jpeg", "webp", "tif", "tiff"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn is_supported_input_ignores_case() {
        assert!(is_supported_input(Path::new("shot.PNG")));
        assert!(is_supported_input(Path::new("a/b/shot.jpeg")));
        assert!(!is_supported_input(Path::new("notes.txt")));
        assert!(!is_supported_input(Path::new("no_extension")));
    }

    #[test]
    fn png_encode_has_signature() {
        let backend = RustBackend::new();
        let png = backend.encode_png(&gradient(40, 30)).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn png_is_lossless() {
        let backend = RustBackend::new();
        let original = gradient(17, 9);
        let png = backend.encode_png(&original).unwrap();
        let decoded = backend.decode(&png).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_garbage_is_load_error() {
        let backend = RustBackend::new();
        let err = backend.decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, BackendError::LoadError(_)));
    }

    #[test]
    fn decode_jpeg_to_rgba() {
        let rgb = image::RgbImage::from_fn(20, 10, |x, _| image::Rgb([x as u8 * 10, 0, 0]));
        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut bytes)
            .write_image(rgb.as_raw(), 20, 10, ExtendedColorType::Rgb8)
            .unwrap();

        let decoded = RustBackend::new().decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }
}
