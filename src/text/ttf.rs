//! TrueType font rendering.
//!
//! Lays out and rasterizes text with ab_glyph into an anti-aliased coverage
//! buffer. The font file is loaded at runtime so each template can ship with
//! the typeface it was calibrated against.

use ab_glyph::{Font, FontArc, ScaleFont};
use std::path::Path;

use super::{FontBackend, GlyphCoverage};
use crate::error::TimesheetError;

/// A TrueType/OpenType font.
#[derive(Clone)]
pub struct TtfFont {
    font: FontArc,
}

impl std::fmt::Debug for TtfFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFont").finish_non_exhaustive()
    }
}

impl TtfFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TimesheetError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| TimesheetError::Font(format!("Invalid font data: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self, TimesheetError> {
        let bytes = std::fs::read(path).map_err(|e| {
            TimesheetError::Font(format!("Failed to read font {}: {}", path.display(), e))
        })?;
        Self::from_bytes(bytes)
    }

    /// Glyph ids paired with their x offset, plus the total advance.
    fn layout(&self, text: &str, px: f32) -> (Vec<(ab_glyph::GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(px);
        let mut glyphs = Vec::new();
        let mut caret_x = 0.0f32;
        let mut previous = None;

        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        (glyphs, caret_x)
    }
}

impl FontBackend for TtfFont {
    fn measure(&self, text: &str, px: f32) -> f32 {
        self.layout(text, px).1
    }

    fn rasterize(&self, text: &str, px: f32) -> Result<GlyphCoverage, TimesheetError> {
        let (glyphs, advance) = self.layout(text, px);
        let scaled = self.font.as_scaled(px);

        let width = (advance.ceil() as usize).max(1);
        let ascent = scaled.ascent();
        let height = ((ascent - scaled.descent()).ceil() as usize).max(1);

        let mut coverage = GlyphCoverage::empty(width, height);

        for &(glyph_id, glyph_x) in &glyphs {
            let glyph = glyph_id.with_scale_and_position(px, ab_glyph::point(glyph_x, ascent));

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, c| {
                    let x = gx as i32 + bounds.min.x as i32;
                    let y = gy as i32 + bounds.min.y as i32;

                    if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                        let idx = y as usize * width + x as usize;
                        coverage.data[idx] = (coverage.data[idx] + c).min(1.0);
                    }
                });
            }
        }

        Ok(coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_bytes() {
        let err = TtfFont::from_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, TimesheetError::Font(_)));
    }

    #[test]
    fn test_missing_font_file() {
        let err = TtfFont::from_path(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }
}
