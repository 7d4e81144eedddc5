//! Device chassis for FRAME exports.
//!
//! The body is a rounded rectangle extending [`BEZEL`] of the canvas width
//! beyond the content rectangle, filled with a left-to-right gradient
//! (chassis color → tinted midpoint → chassis color) over a soft drop
//! shadow. Portrait phones also get a camera cutout centered in the top
//! bezel: a pill on Apple, a punch-hole circle on Android.
//!
//! All sizes are fractions of the canvas width.

use super::backend::BackendError;
use super::calculations::Rect;
use super::raster::{Axis, RoundedRect, Surface, Texture};
use crate::devices::{DeviceSpec, Platform};
use crate::types::Rgb;
use image::imageops;

pub const BEZEL: f64 = 0.04;
pub const BODY_RADIUS_TABLET: f64 = 0.04;
pub const BODY_RADIUS_PHONE: f64 = 0.10;
pub const SHADOW_BLUR: f64 = 0.08;
pub const SHADOW_OFFSET_Y: f64 = 0.04;
pub const SHADOW_OPACITY: f32 = 0.5;
/// How far the gradient midpoint moves toward white (Apple) or black (Android).
pub const MIDPOINT_TINT: f64 = 0.18;

const ISLAND_WIDTH: f64 = 0.18;
const ISLAND_HEIGHT: f64 = 0.022;
const CAMERA_RADIUS: f64 = 0.011;
const CUTOUT_COLOR: Rgb = Rgb::new(5, 5, 5);

/// Camera cutout drawn in the top bezel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutout {
    /// Apple "dynamic island" pill.
    Island(RoundedRect),
    /// Android punch-hole camera.
    Camera(RoundedRect),
}

impl Cutout {
    pub fn shape(&self) -> &RoundedRect {
        match self {
            Cutout::Island(s) | Cutout::Camera(s) => s,
        }
    }
}

/// Resolved chassis shapes for one spec and content rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisGeometry {
    pub body: RoundedRect,
    pub shadow: RoundedRect,
    pub shadow_blur: f64,
    pub cutout: Option<Cutout>,
}

impl ChassisGeometry {
    pub fn for_spec(spec: &DeviceSpec, content: &Rect) -> Self {
        let w = spec.width as f64;
        let bezel = w * BEZEL;
        let radius = if spec.is_tablet {
            w * BODY_RADIUS_TABLET
        } else {
            w * BODY_RADIUS_PHONE
        };
        let body = RoundedRect::new(content.expand(bezel), radius);
        let shadow = body.offset(0.0, w * SHADOW_OFFSET_Y);

        let cutout = (!spec.is_tablet && spec.is_portrait()).then(|| {
            let cx = content.center_x();
            let cy = body.rect.y + bezel / 2.0;
            match spec.platform {
                Platform::Apple => {
                    let (iw, ih) = (w * ISLAND_WIDTH, w * ISLAND_HEIGHT);
                    Cutout::Island(RoundedRect::new(
                        Rect::new(cx - iw / 2.0, cy - ih / 2.0, iw, ih),
                        ih / 2.0,
                    ))
                }
                Platform::Android => Cutout::Camera(RoundedRect::circle(cx, cy, w * CAMERA_RADIUS)),
            }
        });

        Self {
            body,
            shadow,
            shadow_blur: w * SHADOW_BLUR,
            cutout,
        }
    }
}

/// Gradient endpoint and midpoint colors for a chassis.
pub fn gradient_stops(color: Rgb, platform: Platform) -> (Rgb, Rgb) {
    let mid = match platform {
        Platform::Apple => color.mix(Rgb::new(255, 255, 255), MIDPOINT_TINT),
        Platform::Android => color.mix(Rgb::new(0, 0, 0), MIDPOINT_TINT),
    };
    (color, mid)
}

/// Draw shadow, body and cutout around `content`.
pub fn draw_chassis(
    surface: &mut Surface,
    spec: &DeviceSpec,
    content: &Rect,
    color: Rgb,
) -> Result<(), BackendError> {
    let geometry = ChassisGeometry::for_spec(spec, content);
    tracing::debug!(?geometry, %color, "drawing chassis");

    draw_shadow(surface, &geometry)?;

    let (edge, mid) = gradient_stops(color, spec.platform);
    let body = geometry.body.rect;
    let width = body.width.ceil().max(1.0) as u32;
    let height = body.height.ceil().max(1.0) as u32;
    let fill = Texture::gradient(width, height, Axis::Horizontal, |t| {
        if t < 0.5 {
            edge.mix(mid, t * 2.0)
        } else {
            mid.mix(edge, (t - 0.5) * 2.0)
        }
    })?;
    surface.draw_texture(&fill, body.x, body.y, Some(&geometry.body.to_path()), 1.0);

    if let Some(cutout) = geometry.cutout {
        surface.fill_path(&cutout.shape().to_path(), CUTOUT_COLOR, 1.0);
    }
    Ok(())
}

/// Render the shadow shape into its own layer, blur it and composite.
fn draw_shadow(surface: &mut Surface, geometry: &ChassisGeometry) -> Result<(), BackendError> {
    let (width, height) = surface.size();
    let mut mask = Surface::new(width, height)?;
    mask.fill_path(&geometry.shadow.to_path(), Rgb::new(0, 0, 0), 1.0);
    let sigma = (geometry.shadow_blur / 2.0) as f32;
    let layer = imageops::fast_blur(&mask.into_premultiplied(), sigma);
    surface.draw_texture(
        &Texture::from_premultiplied(&layer)?,
        0.0,
        0.0,
        None,
        SHADOW_OPACITY,
    );
    Ok(())
}
