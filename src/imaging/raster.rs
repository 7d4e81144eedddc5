//! Drawing surface on top of `vello_cpu`.
//!
//! Shapes become `kurbo` paths, gradients and pictures become image paints,
//! and everything is composited by a single-threaded `RenderContext` so the
//! output depends only on the inputs. Canvas pixels are read back as
//! straight-alpha RGBA.

use super::backend::BackendError;
use super::calculations::Rect;
use crate::types::Rgb;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use vello_cpu::kurbo::{self, Affine, BezPath, Shape};
use vello_cpu::peniko::color::PremulRgba8;

const PATH_TOLERANCE: f64 = 0.1;

/// A rectangle with uniformly rounded corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radius: f64,
}

impl RoundedRect {
    /// The radius is clamped so opposite corners never overlap.
    pub fn new(rect: Rect, radius: f64) -> Self {
        let max_radius = (rect.width.min(rect.height) / 2.0).max(0.0);
        Self {
            rect,
            radius: radius.clamp(0.0, max_radius),
        }
    }

    /// A circle of radius `r` centered on `(cx, cy)`.
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new(Rect::new(cx - r, cy - r, 2.0 * r, 2.0 * r), r)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            rect: Rect::new(
                self.rect.x + dx,
                self.rect.y + dy,
                self.rect.width,
                self.rect.height,
            ),
            radius: self.radius,
        }
    }

    /// Outline as a flattened path in canvas coordinates.
    pub fn to_path(&self) -> BezPath {
        let r = &self.rect;
        kurbo::RoundedRect::new(r.x, r.y, r.right(), r.bottom(), self.radius)
            .to_path(PATH_TOLERANCE)
    }
}

/// Direction a [`Texture::gradient`] varies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A premultiplied image paint together with its pixel size.
#[derive(Clone)]
pub struct Texture {
    paint: vello_cpu::Image,
    width: f64,
    height: f64,
}

impl Texture {
    /// Wrap a straight-alpha image.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, BackendError> {
        let pixels = image
            .pixels()
            .map(|&Rgba([r, g, b, a])| premultiply(r, g, b, a))
            .collect();
        Self::from_pixels(pixels, image.width(), image.height())
    }

    /// Wrap an image whose color channels are already multiplied by alpha.
    pub fn from_premultiplied(image: &RgbaImage) -> Result<Self, BackendError> {
        let pixels = image
            .pixels()
            .map(|&Rgba([r, g, b, a])| PremulRgba8 { r, g, b, a })
            .collect();
        Self::from_pixels(pixels, image.width(), image.height())
    }

    /// Opaque linear gradient, `color_at` receiving `0.0..=1.0` along `axis`.
    pub fn gradient<F>(width: u32, height: u32, axis: Axis, color_at: F) -> Result<Self, BackendError>
    where
        F: Fn(f64) -> Rgb,
    {
        let steps = match axis {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        };
        let last = steps.saturating_sub(1).max(1) as f64;
        let colors: Vec<Rgba<u8>> = (0..steps)
            .map(|i| {
                let c = color_at(i as f64 / last);
                Rgba([c.r, c.g, c.b, 255])
            })
            .collect();
        let image = RgbaImage::from_fn(width, height, |x, y| match axis {
            Axis::Horizontal => colors[x as usize],
            Axis::Vertical => colors[y as usize],
        });
        Self::from_rgba(&image)
    }

    fn from_pixels(pixels: Vec<PremulRgba8>, width: u32, height: u32) -> Result<Self, BackendError> {
        let w = to_u16(width, "texture width")?;
        let h = to_u16(height, "texture height")?;
        let may_have_opacities = pixels.iter().any(|p| p.a != 255);
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: width as f64,
            height: height as f64,
        })
    }
}

/// A canvas being drawn into.
pub struct Surface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl Surface {
    /// Fully transparent canvas. Fails when either side is zero or exceeds `u16`.
    pub fn new(width: u32, height: u32) -> Result<Self, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::NoRenderContext(format!(
                "surface size {width}x{height}"
            )));
        }
        let width = to_u16(width, "canvas width")?;
        let height = to_u16(height, "canvas height")?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Cover the whole canvas with an opaque color.
    pub fn fill_canvas(&mut self, color: Rgb) {
        let bounds = self.bounds_path();
        self.fill_path(&bounds, color, 1.0);
    }

    /// Fill `path` with a solid color at `opacity`.
    pub fn fill_path(&mut self, path: &BezPath, color: Rgb, opacity: f32) {
        self.reset_transforms();
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255));
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx.fill_path(path);
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
    }

    /// Paint `texture` with its top-left corner at `(x, y)`, restricted to
    /// `clip` when given.
    pub fn draw_texture(
        &mut self,
        texture: &Texture,
        x: f64,
        y: f64,
        clip: Option<&BezPath>,
        opacity: f32,
    ) {
        self.reset_transforms();
        if let Some(clip) = clip {
            self.ctx.push_clip_layer(clip);
        }
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx.set_transform(Affine::translate((x, y)));
        self.ctx.set_paint(texture.paint.clone());
        self.ctx
            .fill_rect(&kurbo::Rect::new(0.0, 0.0, texture.width, texture.height));
        self.ctx.set_transform(Affine::IDENTITY);
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        if clip.is_some() {
            self.ctx.pop_layer();
        }
    }

    /// Rasterize and return premultiplied pixels.
    pub fn into_premultiplied(mut self) -> RgbaImage {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        RgbaImage::from_raw(
            self.width as u32,
            self.height as u32,
            pixmap.data_as_u8_slice().to_vec(),
        )
        .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }

    /// Rasterize and return straight-alpha pixels.
    pub fn into_image(self) -> RgbaImage {
        let mut image = self.into_premultiplied();
        for px in image.pixels_mut() {
            *px = unpremultiply(*px);
        }
        image
    }

    fn bounds_path(&self) -> BezPath {
        kurbo::Rect::new(0.0, 0.0, self.width as f64, self.height as f64).to_path(PATH_TOLERANCE)
    }

    fn reset_transforms(&mut self) {
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint_transform(Affine::IDENTITY);
    }
}

fn to_u16(value: u32, what: &str) -> Result<u16, BackendError> {
    value
        .try_into()
        .map_err(|_| BackendError::NoRenderContext(format!("{what} {value} exceeds u16")))
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> PremulRgba8 {
    let af = a as u16 + 1;
    let premul = |c: u8| ((c as u16 * af) >> 8) as u8;
    PremulRgba8 {
        r: premul(r),
        g: premul(g),
        b: premul(b),
        a,
    }
}

fn unpremultiply(Rgba([r, g, b, a]): Rgba<u8>) -> Rgba<u8> {
    match a {
        0 => Rgba([0, 0, 0, 0]),
        255 => Rgba([r, g, b, 255]),
        _ => {
            let straight = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            Rgba([straight(r), straight(g), straight(b), a])
        }
    }
}
