//! Software pixel surface
//!
//! RGBA8 pixels with premultiplied alpha, composited source-over. A pixel is
//! covered by a shape when its center lies inside it, so two shapes that don't
//! overlap never touch the same pixel. The brick cache depends on that to make
//! a single-cell patch indistinguishable from a full rerender.

use glam::Vec2;

use crate::sim::Rect;

/// Straight-alpha color in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self::rgba(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            1.0,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Multiply opacity by `factor`
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Premultiplied 8-bit pixel
    pub fn to_pixel(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), (a * 255.0).round() as u8]
    }
}

/// Evenly spaced multi-stop gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient<const N: usize> {
    pub stops: [Color; N],
}

impl<const N: usize> Gradient<N> {
    pub const fn new(stops: [Color; N]) -> Self {
        Self { stops }
    }

    /// Color at `t` in `[0, 1]`
    pub fn at(&self, t: f32) -> Color {
        if N == 0 {
            return Color::TRANSPARENT;
        }
        if N == 1 {
            return self.stops[0];
        }
        let scaled = t.clamp(0.0, 1.0) * (N - 1) as f32;
        let i = (scaled.floor() as usize).min(N - 2);
        self.stops[i].lerp(self.stops[i + 1], scaled - i as f32)
    }
}

/// Source-over for premultiplied pixels
#[inline]
fn blend(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let inv = 255 - src[3] as u16;
    let mut out = [0u8; 4];
    for i in 0..4 {
        let d = dst[i] as u16 * inv;
        let scaled = (d + 1 + (d >> 8)) >> 8;
        out[i] = (src[i] as u16 + scaled).min(255) as u8;
    }
    out
}

/// Half-open pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    /// Every pixel `rect` touches at all
    pub fn touched_by(rect: &Rect) -> Self {
        Self {
            x0: rect.x.floor() as i32,
            y0: rect.y.floor() as i32,
            x1: rect.right().ceil() as i32,
            y1: rect.bottom().ceil() as i32,
        }
    }

    pub fn intersect(&self, other: &PixelRect) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// CPU-side RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    clip: Option<PixelRect>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width * height) as usize],
            clip: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for a new size; contents become transparent
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width * height) as usize, [0; 4]);
        self.clip = None;
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Restrict drawing to `clip` until cleared
    pub fn set_clip(&mut self, clip: Option<PixelRect>) {
        self.clip = clip;
    }

    fn bounds(&self) -> PixelRect {
        let full = PixelRect {
            x0: 0,
            y0: 0,
            x1: self.width as i32,
            y1: self.height as i32,
        };
        match &self.clip {
            Some(clip) => full.intersect(clip),
            None => full,
        }
    }

    /// Make every pixel transparent
    pub fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    /// Make every pixel `rect` touches transparent (ignores the clip)
    pub fn clear_rect(&mut self, rect: &Rect) {
        let full = PixelRect {
            x0: 0,
            y0: 0,
            x1: self.width as i32,
            y1: self.height as i32,
        };
        let area = PixelRect::touched_by(rect).intersect(&full);
        if area.is_empty() {
            return;
        }
        for y in area.y0..area.y1 {
            let row = (y as u32 * self.width) as usize;
            self.pixels[row + area.x0 as usize..row + area.x1 as usize].fill([0; 4]);
        }
    }

    /// Composite `color` over every pixel (within the clip)
    pub fn fill(&mut self, color: Color) {
        let area = self.bounds();
        let src = color.to_pixel();
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let i = (y as u32 * self.width + x as u32) as usize;
                self.pixels[i] = blend(self.pixels[i], src);
            }
        }
    }

    /// Fill the pixels inside `shape` (signed distance <= 0) within `extent`
    ///
    /// `paint` is sampled at each covered pixel center.
    pub fn fill_shape(
        &mut self,
        extent: &Rect,
        shape: impl Fn(Vec2) -> f32,
        paint: impl Fn(Vec2) -> Color,
    ) {
        let area = PixelRect::touched_by(extent).intersect(&self.bounds());
        if area.is_empty() {
            return;
        }
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if shape(p) <= 0.0 {
                    let i = (y as u32 * self.width + x as u32) as usize;
                    self.pixels[i] = blend(self.pixels[i], paint(p).to_pixel());
                }
            }
        }
    }

    /// Stroke the outline of `shape` with a band `width` pixels wide
    pub fn stroke_shape(
        &mut self,
        extent: &Rect,
        width: f32,
        shape: impl Fn(Vec2) -> f32,
        paint: impl Fn(Vec2) -> Color,
    ) {
        let half = width / 2.0;
        self.fill_shape(&extent.inflate(half), |p| shape(p).abs() - half, paint);
    }

    /// Composite a same-sized surface over this one
    pub fn blit(&mut self, src: &Surface) {
        if src.width != self.width || src.height != self.height {
            log::warn!(
                "Blit size mismatch {}x{} onto {}x{}, skipping",
                src.width,
                src.height,
                self.width,
                self.height
            );
            return;
        }
        let area = self.bounds();
        for y in area.y0..area.y1 {
            let row = (y as u32 * self.width) as usize;
            for i in row + area.x0 as usize..row + area.x1 as usize {
                let s = src.pixels[i];
                if s[3] == 255 {
                    self.pixels[i] = s;
                } else if s[3] != 0 {
                    self.pixels[i] = blend(self.pixels[i], s);
                }
            }
        }
    }

    /// Draw `image` scaled into `dest`, masked by `shape`
    pub fn draw_image(&mut self, image: &Sprite, dest: &Rect, shape: impl Fn(Vec2) -> f32) {
        if image.width == 0 || image.height == 0 || dest.w <= 0.0 || dest.h <= 0.0 {
            return;
        }
        let area = PixelRect::touched_by(dest).intersect(&self.bounds());
        if area.is_empty() {
            return;
        }
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if shape(p) > 0.0 {
                    continue;
                }
                let u = ((p.x - dest.x) / dest.w * image.width as f32) as u32;
                let v = ((p.y - dest.y) / dest.h * image.height as f32) as u32;
                let texel = image.texel(u.min(image.width - 1), v.min(image.height - 1));
                let i = (y as u32 * self.width + x as u32) as usize;
                self.pixels[i] = blend(self.pixels[i], texel);
            }
        }
    }
}

/// Small premultiplied RGBA image (the ball logo)
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    texels: Vec<[u8; 4]>,
}

impl Sprite {
    /// Decode an encoded image (PNG)
    pub fn from_png(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            texels: img.pixels().map(|p| premultiply(p.0)).collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Wrap straight-alpha RGBA8 bytes; `None` if the length doesn't match
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != (width * height * 4) as usize {
            return None;
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|c| premultiply([c[0], c[1], c[2], c[3]]))
            .collect();
        Some(Self {
            width,
            height,
            texels,
        })
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.texels[(y * self.width + x) as usize]
    }
}

/// Straight-alpha RGBA8 to a premultiplied surface pixel
fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    Color::rgba(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    )
    .to_pixel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_fill_replaces() {
        let mut s = Surface::new(4, 4);
        s.fill(Color::hex(0x102030));
        assert_eq!(s.pixel(1, 1), Some([0x10, 0x20, 0x30, 255]));
    }

    #[test]
    fn test_translucent_over_transparent_keeps_alpha() {
        let mut s = Surface::new(2, 2);
        s.fill(Color::WHITE.with_alpha(0.5));
        let p = s.pixel(0, 0).unwrap();
        assert_eq!(p[3], 128);
        assert_eq!(p[0], 128);
    }

    #[test]
    fn test_center_rule_coverage() {
        let mut s = Surface::new(10, 10);
        let rect = Rect::new(2.0, 2.0, 3.0, 3.0);
        s.fill_shape(&rect, |p| crate::renderer::sdf::sd_box(p, &rect), |_| Color::WHITE);
        assert_eq!(s.pixel(2, 2).unwrap()[3], 255);
        assert_eq!(s.pixel(4, 4).unwrap()[3], 255);
        assert_eq!(s.pixel(5, 5).unwrap()[3], 0);
        assert_eq!(s.pixel(1, 2).unwrap()[3], 0);
    }

    #[test]
    fn test_clip_limits_drawing() {
        let mut s = Surface::new(8, 8);
        s.set_clip(Some(PixelRect { x0: 0, y0: 0, x1: 4, y1: 8 }));
        s.fill(Color::BLACK);
        s.set_clip(None);
        assert_eq!(s.pixel(3, 0).unwrap()[3], 255);
        assert_eq!(s.pixel(4, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_clear_rect_rounds_outward() {
        let mut s = Surface::new(8, 8);
        s.fill(Color::BLACK);
        s.clear_rect(&Rect::new(1.5, 1.5, 2.0, 2.0));
        assert_eq!(s.pixel(1, 1).unwrap()[3], 0);
        assert_eq!(s.pixel(3, 3).unwrap()[3], 0);
        assert_eq!(s.pixel(4, 4).unwrap()[3], 255);
    }

    #[test]
    fn test_blit_composites() {
        let mut base = Surface::new(2, 1);
        base.fill(Color::BLACK);
        let mut layer = Surface::new(2, 1);
        layer.set_clip(Some(PixelRect { x0: 1, y0: 0, x1: 2, y1: 1 }));
        layer.fill(Color::WHITE);
        base.blit(&layer);
        assert_eq!(base.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(base.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_gradient_stops() {
        let g = Gradient::new([Color::BLACK, Color::WHITE, Color::BLACK]);
        assert_eq!(g.at(0.0), Color::BLACK);
        assert_eq!(g.at(0.5), Color::WHITE);
        assert_eq!(g.at(1.0), Color::BLACK);
        assert!((g.at(0.25).r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sprite_length_checked() {
        assert!(Sprite::from_rgba(2, 2, &[0; 15]).is_none());
        assert!(Sprite::from_rgba(2, 2, &[0; 16]).is_some());
    }

    #[test]
    fn test_png_sprite_decodes() {
        let logo = Sprite::from_png(include_bytes!("../../assets/ball_logo.png")).unwrap();
        assert_eq!((logo.width(), logo.height()), (64, 64));
        // Corners are transparent, the glyph stroke is opaque
        assert_eq!(logo.texel(0, 0), [0, 0, 0, 0]);
        assert_eq!(logo.texel(20, 30), [0x1a, 0x2a, 0x6c, 255]);
        assert!(Sprite::from_png(b"not a png").is_err());
    }
}
