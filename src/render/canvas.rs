//! RGBA drawing surface with a clip stack.
//!
//! Everything drawn is source-over blended and restricted to the innermost
//! clip rectangle. `push_clip` intersects with the current clip, so nested
//! clips can only shrink the drawable area.

use image::{Rgb, Rgba, RgbaImage};

use crate::layout::Rect;
use crate::text::GlyphCoverage;

/// Pixel-aligned clip bounds, exclusive on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClipBounds {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl ClipBounds {
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    fn intersect(&self, other: &ClipBounds) -> ClipBounds {
        ClipBounds {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1).max(self.x0.max(other.x0)),
            y1: self.y1.min(other.y1).max(self.y0.max(other.y0)),
        }
    }
}

/// Working canvas for one render.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    clips: Vec<ClipBounds>,
}

impl Canvas {
    /// A transparent canvas of exactly `width` × `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            clips: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    fn current_clip(&self) -> ClipBounds {
        let full = ClipBounds {
            x0: 0,
            y0: 0,
            x1: self.image.width() as i64,
            y1: self.image.height() as i64,
        };
        match self.clips.last() {
            Some(clip) => full.intersect(clip),
            None => full,
        }
    }

    /// Restrict drawing to `rect` (intersected with any current clip).
    pub fn push_clip(&mut self, rect: Rect) {
        let bounds = ClipBounds {
            x0: rect.x.floor() as i64,
            y0: rect.y.floor() as i64,
            x1: rect.right().ceil() as i64,
            y1: rect.bottom().ceil() as i64,
        };
        let clipped = self.current_clip().intersect(&bounds);
        self.clips.push(clipped);
    }

    /// Drop the innermost clip.
    pub fn pop_clip(&mut self) {
        self.clips.pop();
    }

    /// Blend `color` at `alpha` over the pixel at (x, y), honouring the clip.
    fn blend(&mut self, clip: &ClipBounds, x: i64, y: i64, color: [u8; 3], alpha: f32) {
        if alpha <= 0.0 || !clip.contains(x, y) {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let da = dst[3] as f32 / 255.0;
        let sa = alpha.min(1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let val = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
            dst[c] = val.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Draw an image with its top-left at (x, y).
    pub fn draw_image(&mut self, source: &RgbaImage, x: f32, y: f32) {
        let clip = self.current_clip();
        let ox = x.round() as i64;
        let oy = y.round() as i64;
        for (sx, sy, pixel) in source.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            self.blend(
                &clip,
                ox + sx as i64,
                oy + sy as i64,
                [r, g, b],
                a as f32 / 255.0,
            );
        }
    }

    /// Fill a line of rasterized text starting at `x`, vertically centred on `y_mid`.
    pub fn fill_text(&mut self, glyphs: &GlyphCoverage, x: f32, y_mid: f32, color: Rgb<u8>) {
        let clip = self.current_clip();
        let ox = x.round() as i64;
        let oy = (y_mid - glyphs.height as f32 / 2.0).round() as i64;
        for gy in 0..glyphs.height {
            for gx in 0..glyphs.width {
                let coverage = glyphs.get(gx, gy);
                self.blend(&clip, ox + gx as i64, oy + gy as i64, color.0, coverage);
            }
        }
    }

    #[cfg(test)]
    fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
