//! Viewport compositor.
//!
//! Renders one device variant from the master image. The same function
//! backs the live preview and the final export, so the two are identical
//! pixel for pixel.
//!
//! ```text
//! 1. background      flat near-black (RECTANGLE) or dark gradient (FRAME)
//! 2. content rect    full canvas, Apple FIT breathing room, or FRAME bezel inset
//! 3. chassis         FRAME only: shadow, gradient body, camera cutout
//! 4. source rect     crop percentages resolved against the master
//! 5. fit             FIT letterbox / AUTOFIT cover (tablet height lock) / STRETCH
//! 6. draw            crop, Lanczos3 resize, tone filter, clipped to the screen shape in FRAME
//! 7. sharpen         optional 3×3 pass over the whole canvas
//! 8. encode          lossless PNG
//! ```
//!
//! Rendering is a pure function of its inputs: no caches, no shared mutable
//! state. Each call allocates its own canvas.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{Rect, content_rect, crop_to_pixels, fit_destination, source_rect};
use super::chassis::draw_chassis;
use super::filters::{ToneFilter, sharpen};
use super::normalize::MasterImage;
use super::raster::{Axis, RoundedRect, Surface, Texture};
use crate::devices::{DeviceSpec, default_chassis_color};
use crate::types::{CropArea, ExportMode, FitMode, ImageAdjustments, Rgb};
use image::RgbaImage;
use image::imageops::{self, FilterType};

pub const RECTANGLE_BACKGROUND: Rgb = Rgb::new(10, 10, 10);
pub const FRAME_BACKGROUND_TOP: Rgb = Rgb::new(28, 28, 30);
pub const FRAME_BACKGROUND_BOTTOM: Rgb = Rgb::new(0, 0, 0);
/// Screen corner radius inside the chassis, as a fraction of canvas width.
pub const SCREEN_RADIUS_TABLET: f64 = 0.03;
pub const SCREEN_RADIUS_PHONE: f64 = 0.08;

/// Everything one render depends on besides the master pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub spec: DeviceSpec,
    pub fit: FitMode,
    pub mode: ExportMode,
    pub adjustments: ImageAdjustments,
    pub crop: CropArea,
    /// Falls back to the platform's default swatch when absent.
    pub chassis_color: Option<Rgb>,
}

impl RenderRequest {
    /// Full-frame, neutral request for a spec.
    pub fn new(spec: DeviceSpec, fit: FitMode, mode: ExportMode) -> Self {
        Self {
            spec,
            fit,
            mode,
            adjustments: ImageAdjustments::NEUTRAL,
            crop: CropArea::FULL,
            chassis_color: None,
        }
    }
}

/// Resolved geometry of a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Content rectangle on the canvas.
    pub target: Rect,
    /// Sampled region of the master, in master pixels.
    pub source: Rect,
    /// Where the sampled region lands on the canvas.
    pub dest: Rect,
    /// Screen shape content is clipped to (FRAME only).
    pub clip: Option<RoundedRect>,
}

/// Compute the layout of a render without touching pixels.
pub fn plan_layout(
    master_width: u32,
    master_height: u32,
    request: &RenderRequest,
) -> Result<Layout, BackendError> {
    let spec = &request.spec;
    if spec.width == 0 || spec.height == 0 {
        return Err(BackendError::NoRenderContext(format!(
            "canvas size {}x{} for {}",
            spec.width, spec.height, spec.id
        )));
    }
    if master_width == 0 || master_height == 0 {
        return Err(BackendError::NoRenderContext(
            "master image has no pixels".into(),
        ));
    }
    request.crop.validate()?;

    let target = content_rect(spec, request.fit, request.mode);
    let source = source_rect(&request.crop, master_width, master_height);
    let dest = fit_destination(&source, &target, request.fit, spec);
    let clip = (request.mode == ExportMode::Frame).then(|| {
        let fraction = if spec.is_tablet {
            SCREEN_RADIUS_TABLET
        } else {
            SCREEN_RADIUS_PHONE
        };
        RoundedRect::new(target, spec.width as f64 * fraction)
    });

    Ok(Layout {
        target,
        source,
        dest,
        clip,
    })
}

/// Render a variant to an uncompressed raster of exactly the device's size.
#[tracing::instrument(skip(master), fields(device = %request.spec.id, fit = request.fit.as_str(), mode = request.mode.as_str()))]
pub fn render_raster(
    master: &MasterImage,
    request: &RenderRequest,
) -> Result<RgbaImage, BackendError> {
    let layout = plan_layout(master.width(), master.height(), request)?;
    tracing::debug!(?layout, "resolved layout");

    let spec = &request.spec;
    let mut surface = Surface::new(spec.width, spec.height)?;

    match request.mode {
        ExportMode::Rectangle => surface.fill_canvas(RECTANGLE_BACKGROUND),
        ExportMode::Frame => {
            let background = Texture::gradient(spec.width, spec.height, Axis::Vertical, |t| {
                FRAME_BACKGROUND_TOP.mix(FRAME_BACKGROUND_BOTTOM, t)
            })?;
            surface.draw_texture(&background, 0.0, 0.0, None, 1.0);
            let color = request
                .chassis_color
                .unwrap_or_else(|| default_chassis_color(spec.platform));
            draw_chassis(&mut surface, spec, &layout.target, color)?;
        }
    }

    let tone = ToneFilter::from_adjustments(&request.adjustments);
    let content = scaled_content(master.pixels(), &request.crop, &layout, tone.as_ref());
    let clip = layout.clip.map(|c| c.to_path());
    surface.draw_texture(
        &Texture::from_rgba(&content)?,
        layout.dest.x.round(),
        layout.dest.y.round(),
        clip.as_ref(),
        1.0,
    );

    let mut canvas = surface.into_image();
    if request.adjustments.sharpness > 0.0 {
        sharpen(&mut canvas, request.adjustments.sharpness);
    }

    Ok(canvas)
}

/// Render and encode a variant as PNG.
pub fn render(
    backend: &impl ImageBackend,
    master: &MasterImage,
    request: &RenderRequest,
) -> Result<Vec<u8>, BackendError> {
    let canvas = render_raster(master, request)?;
    backend.encode_png(&canvas)
}

/// The cropped master resized to the destination size, tone filter applied.
fn scaled_content(
    master: &RgbaImage,
    crop: &CropArea,
    layout: &Layout,
    tone: Option<&ToneFilter>,
) -> RgbaImage {
    let (x, y, w, h) = crop_to_pixels(crop, master.width(), master.height());
    let region = imageops::crop_imm(master, x, y, w, h).to_image();
    let width = layout.dest.width.round().max(1.0) as u32;
    let height = layout.dest.height.round().max(1.0) as u32;
    let mut content = if (width, height) == region.dimensions() {
        region
    } else {
        imageops::resize(&region, width, height, FilterType::Lanczos3)
    };

    if let Some(tone) = tone {
        for px in content.pixels_mut() {
            let rgb = tone.apply([px[0] as f64, px[1] as f64, px[2] as f64]);
            for (c, v) in rgb.iter().enumerate() {
                px[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceId;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::rust_backend::RustBackend;
    use crate::test_helpers::{
        checkerboard, count_differing_interior_pixels, count_differing_pixels, gradient,
        small_spec, solid,
    };
    use image::Rgba;

    fn request(spec: DeviceSpec, fit: FitMode, mode: ExportMode) -> RenderRequest {
        RenderRequest::new(spec, fit, mode)
    }

    fn assert_close(actual: &Rgba<u8>, expected: [u8; 4]) {
        let off = actual.0.iter().zip(expected).any(|(a, e)| a.abs_diff(e) > 2);
        assert!(!off, "expected {expected:?}, got {actual:?}");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[test]
    fn stretch_dest_equals_target() {
        let spec = small_spec(DeviceId::Iphone67, 100, 200);
        for mode in [ExportMode::Rectangle, ExportMode::Frame] {
            let layout = plan_layout(300, 50, &request(spec, FitMode::Stretch, mode)).unwrap();
            assert_eq!(layout.dest, layout.target);
        }
    }

    #[test]
    fn fit_narrow_source_centers_horizontally() {
        let spec = small_spec(DeviceId::AndroidPhone, 200, 200);
        let layout = plan_layout(50, 100, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();
        assert_eq!(layout.dest.y, layout.target.y);
        assert_eq!(layout.dest.x, 50.0);
        assert_eq!(layout.dest.width, 100.0);
    }

    #[test]
    fn fit_wide_source_centers_vertically() {
        let spec = small_spec(DeviceId::AndroidPhone, 200, 200);
        let layout = plan_layout(100, 50, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();
        assert_eq!(layout.dest.x, layout.target.x);
        assert_eq!(layout.dest.y, 50.0);
    }

    #[test]
    fn crop_resolves_against_master_size() {
        let spec = small_spec(DeviceId::AndroidPhone, 100, 100);
        let mut req = request(spec, FitMode::Stretch, ExportMode::Rectangle);
        req.crop = CropArea::new(25.0, 50.0, 50.0, 50.0).unwrap();
        let layout = plan_layout(400, 200, &req).unwrap();
        assert_eq!(layout.source, Rect::new(100.0, 100.0, 200.0, 100.0));
    }

    #[test]
    fn frame_layout_has_clip_with_screen_radius() {
        let spec = small_spec(DeviceId::AndroidPhone, 100, 200);
        let layout = plan_layout(10, 10, &request(spec, FitMode::Fit, ExportMode::Frame)).unwrap();
        let clip = layout.clip.unwrap();
        assert_eq!(clip.rect, layout.target);
        assert!((clip.radius - 8.0).abs() < 1e-9);

        let rect = plan_layout(10, 10, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();
        assert!(rect.clip.is_none());
    }

    #[test]
    fn invalid_crop_is_rejected() {
        let spec = small_spec(DeviceId::AndroidPhone, 10, 10);
        let mut req = request(spec, FitMode::Fit, ExportMode::Rectangle);
        req.crop = CropArea {
            x: 60.0,
            y: 0.0,
            width: 60.0,
            height: 100.0,
        };
        let err = plan_layout(10, 10, &req).unwrap_err();
        assert!(matches!(err, BackendError::InvalidCrop(_)));
    }

    #[test]
    fn zero_sized_canvas_is_no_render_context() {
        let spec = small_spec(DeviceId::AndroidPhone, 0, 10);
        let master = MasterImage::new(gradient(4, 4));
        let err = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Rectangle))
            .unwrap_err();
        assert!(matches!(err, BackendError::NoRenderContext(_)));
    }

    // =========================================================================
    // Pixels
    // =========================================================================

    #[test]
    fn output_always_matches_spec_size() {
        let master = MasterImage::new(gradient(37, 81));
        let crops = [
            CropArea::FULL,
            CropArea::new(10.0, 20.0, 30.0, 10.0).unwrap(),
            CropArea::new(0.0, 0.0, 100.0, 1.0).unwrap(),
        ];
        for id in DeviceId::ALL {
            let spec = small_spec(id, 48, 90);
            for fit in [FitMode::Fit, FitMode::Autofit, FitMode::Stretch] {
                for mode in [ExportMode::Rectangle, ExportMode::Frame] {
                    for crop in crops {
                        let mut req = request(spec, fit, mode);
                        req.crop = crop;
                        let out = render_raster(&master, &req).unwrap();
                        assert_eq!(out.dimensions(), (48, 90), "{id} {fit:?} {mode:?} {crop}");
                    }
                }
            }
        }
    }

    #[test]
    fn matching_android_rectangle_render_is_identity() {
        let shot = gradient(60, 120);
        let master = MasterImage::new(shot.clone());
        let spec = small_spec(DeviceId::AndroidPhone, 60, 120);
        let out = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();
        for (a, b) in out.pixels().zip(shot.pixels()) {
            assert_close(a, b.0);
        }
    }

    #[test]
    fn cropped_region_is_scaled_to_destination() {
        let master = MasterImage::new(gradient(40, 80));
        let spec = small_spec(DeviceId::AndroidPhone, 40, 80);
        let mut req = request(spec, FitMode::Stretch, ExportMode::Rectangle);
        req.crop = CropArea::new(50.0, 50.0, 50.0, 50.0).unwrap();
        let layout = plan_layout(40, 80, &req).unwrap();
        let content = scaled_content(master.pixels(), &req.crop, &layout, None);
        assert_eq!(content.dimensions(), (40, 80));

        // The bottom-right quadrant is the brightest part of the gradient
        let out = render_raster(&master, &req).unwrap();
        let full = render_raster(&master, &request(spec, FitMode::Stretch, ExportMode::Rectangle)).unwrap();
        assert!(out.get_pixel(2, 2)[0] > full.get_pixel(2, 2)[0]);
    }

    #[test]
    fn content_outside_the_crop_never_bleeds_in() {
        let mut shot = solid(20, 20, [0, 0, 255, 255]);
        for y in 0..20 {
            for x in 10..20 {
                shot.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
        let master = MasterImage::new(shot);
        let spec = small_spec(DeviceId::AndroidPhone, 40, 80);
        let mut req = request(spec, FitMode::Stretch, ExportMode::Rectangle);
        req.crop = CropArea::new(0.0, 0.0, 50.0, 100.0).unwrap();
        let out = render_raster(&master, &req).unwrap();
        assert!(out.pixels().all(|p| p[0] < 20), "red half leaked into the blue crop");
    }

    #[test]
    fn letterbox_margins_show_background() {
        let master = MasterImage::new(solid(10, 40, [255, 255, 255, 255]));
        let spec = small_spec(DeviceId::AndroidPhone, 80, 80);
        let out = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();
        let bg = RECTANGLE_BACKGROUND;
        assert_eq!(out.get_pixel(2, 40), &Rgba([bg.r, bg.g, bg.b, 255]));
        assert_close(out.get_pixel(40, 40), [255, 255, 255, 255]);
    }

    #[test]
    fn render_is_deterministic() {
        let master = MasterImage::new(checkerboard(64, 128, 5));
        let spec = small_spec(DeviceId::Iphone67, 70, 150);
        let mut req = request(spec, FitMode::Autofit, ExportMode::Frame);
        req.adjustments = ImageAdjustments {
            brightness: 110.0,
            contrast: 90.0,
            saturation: 120.0,
            sharpness: 40.0,
        };
        req.crop = CropArea::new(5.0, 5.0, 80.0, 70.0).unwrap();

        let backend = RustBackend::new();
        let a = render(&backend, &master, &req).unwrap();
        let b = render(&backend, &master, &req).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sharpness_zero_matches_unsharpened_and_positive_changes_interior() {
        let master = MasterImage::new(checkerboard(40, 80, 3));
        let spec = small_spec(DeviceId::AndroidPhone, 40, 80);
        let plain = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();

        let mut zero = request(spec, FitMode::Fit, ExportMode::Rectangle);
        zero.adjustments.sharpness = 0.0;
        assert_eq!(render_raster(&master, &zero).unwrap(), plain);

        let mut sharp = zero;
        sharp.adjustments.sharpness = 80.0;
        let sharpened = render_raster(&master, &sharp).unwrap();
        assert!(count_differing_interior_pixels(&sharpened, &plain) > 0);
    }

    #[test]
    fn tone_adjustments_change_content() {
        let master = MasterImage::new(gradient(30, 60));
        let spec = small_spec(DeviceId::AndroidPhone, 30, 60);
        let neutral = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Rectangle)).unwrap();

        let mut dim = request(spec, FitMode::Fit, ExportMode::Rectangle);
        dim.adjustments.brightness = 60.0;
        let dimmed = render_raster(&master, &dim).unwrap();
        assert!(count_differing_pixels(&neutral, &dimmed) > 0);
        assert!(dimmed.get_pixel(29, 59)[0] < neutral.get_pixel(29, 59)[0]);
    }

    #[test]
    fn frame_mode_draws_chassis_and_clips_corners() {
        let master = MasterImage::new(solid(50, 100, [255, 255, 255, 255]));
        let spec = small_spec(DeviceId::AndroidPhone, 100, 200);
        let mut req = request(spec, FitMode::Stretch, ExportMode::Frame);
        req.chassis_color = Some(Rgb::new(200, 0, 0));
        let out = render_raster(&master, &req).unwrap();

        // Screen center is content
        assert_close(out.get_pixel(50, 100), [255, 255, 255, 255]);
        // Top-left corner of the content rect is clipped: shows chassis red
        let corner = out.get_pixel(12, 12);
        assert!(corner[0] > corner[1], "expected chassis behind clipped corner, got {corner:?}");
        // Canvas corner is background
        let bg = out.get_pixel(0, 0);
        assert!(bg[0] < 40 && bg[1] < 40 && bg[2] < 40);
    }

    #[test]
    fn default_chassis_color_is_used_when_absent() {
        let master = MasterImage::new(gradient(20, 40));
        let spec = small_spec(DeviceId::AndroidPhone, 100, 200);
        let implicit = render_raster(&master, &request(spec, FitMode::Fit, ExportMode::Frame)).unwrap();
        let mut req = request(spec, FitMode::Fit, ExportMode::Frame);
        req.chassis_color = Some(default_chassis_color(spec.platform));
        assert_eq!(render_raster(&master, &req).unwrap(), implicit);
    }

    #[test]
    fn encode_failure_is_processing_failed() {
        let backend = MockBackend::failing_encode(20, 40);
        let master = MasterImage::new(gradient(20, 40));
        let spec = small_spec(DeviceId::AndroidPhone, 20, 40);
        let err = render(&backend, &master, &request(spec, FitMode::Fit, ExportMode::Rectangle))
            .unwrap_err();
        assert!(matches!(err, BackendError::ProcessingFailed(_)));
    }

}
