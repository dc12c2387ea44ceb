//! Built-in bitmap font.
//!
//! Uses the Spleen 12×24 font, scaled nearest-neighbour to the requested
//! pixel size. Needs no font file, so a template can be rendered with no
//! assets beyond the template image itself.

use spleen_font::{FONT_12X24, PSF2Font};

use super::{FontBackend, GlyphCoverage};
use crate::error::TimesheetError;

const CELL_WIDTH: usize = 12;
const CELL_HEIGHT: usize = 24;

/// Spleen 12×24, scaled to size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpleenFont;

impl SpleenFont {
    pub fn new() -> Self {
        Self
    }

    fn scale(px: f32) -> f32 {
        px / CELL_HEIGHT as f32
    }
}

impl FontBackend for SpleenFont {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * CELL_WIDTH as f32 * Self::scale(px)
    }

    fn rasterize(&self, text: &str, px: f32) -> Result<GlyphCoverage, TimesheetError> {
        let mut spleen = PSF2Font::new(FONT_12X24)
            .map_err(|_| TimesheetError::Font("Failed to load Spleen 12x24".to_string()))?;

        let scale = Self::scale(px);
        let width = (self.measure(text, px).ceil() as usize).max(1);
        let height = ((CELL_HEIGHT as f32 * scale).ceil() as usize).max(1);
        let mut coverage = GlyphCoverage::empty(width, height);

        for (i, ch) in text.chars().enumerate() {
            let mut cell = vec![false; CELL_WIDTH * CELL_HEIGHT];
            let utf8 = ch.to_string();
            if let Some(glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        let idx = row_y * CELL_WIDTH + col_x;
                        if col_x < CELL_WIDTH && idx < cell.len() {
                            cell[idx] = on;
                        }
                    }
                }
            } else {
                fallback_glyph(ch, &mut cell);
            }
            let origin_x = i as f32 * CELL_WIDTH as f32 * scale;

            // Sample the source cell at each destination pixel centre
            let x0 = origin_x.floor() as usize;
            let x1 = ((origin_x + CELL_WIDTH as f32 * scale).ceil() as usize).min(width);
            for y in 0..height {
                let sy = ((y as f32 + 0.5) / scale) as usize;
                if sy >= CELL_HEIGHT {
                    continue;
                }
                for x in x0..x1 {
                    let local = x as f32 + 0.5 - origin_x;
                    if local < 0.0 {
                        continue;
                    }
                    let sx = (local / scale) as usize;
                    if sx < CELL_WIDTH && cell[sy * CELL_WIDTH + sx] {
                        coverage.data[y * width + x] = 1.0;
                    }
                }
            }
        }

        Ok(coverage)
    }
}

/// Cell for a character Spleen doesn't cover.
fn fallback_glyph(ch: char, cell: &mut [bool]) {
    if ch == '…' {
        draw_ellipsis(cell);
    } else if !ch.is_whitespace() {
        draw_box(cell);
    }
}

/// Three 2×2 dots on the baseline.
fn draw_ellipsis(cell: &mut [bool]) {
    for dot in 0..3 {
        let x0 = 1 + dot * 4;
        for y in 17..19 {
            for x in x0..x0 + 2 {
                cell[y * CELL_WIDTH + x] = true;
            }
        }
    }
}

/// Outline box for characters the font doesn't cover.
fn draw_box(cell: &mut [bool]) {
    for y in 4..20 {
        for x in 2..10 {
            if y == 4 || y == 19 || x == 2 || x == 9 {
                cell[y * CELL_WIDTH + x] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_scales_with_size() {
        let font = SpleenFont::new();
        assert_eq!(font.measure("abc", 24.0), 36.0);
        assert_eq!(font.measure("abc", 12.0), 18.0);
    }

    #[test]
    fn test_rasterize_has_ink() {
        let font = SpleenFont::new();
        let glyphs = font.rasterize("Hi", 24.0).unwrap();
        assert_eq!(glyphs.width, 24);
        assert_eq!(glyphs.height, 24);
        assert!(glyphs.data.iter().any(|&c| c > 0.0));
    }

    #[test]
    fn test_rasterize_scaled_down() {
        let font = SpleenFont::new();
        let glyphs = font.rasterize("Hi", 12.0).unwrap();
        assert_eq!(glyphs.width, 12);
        assert_eq!(glyphs.height, 12);
        assert!(glyphs.data.iter().any(|&c| c > 0.0));
    }

    #[test]
    fn test_space_is_blank() {
        let font = SpleenFont::new();
        let glyphs = font.rasterize(" ", 24.0).unwrap();
        assert!(glyphs.data.iter().all(|&c| c == 0.0));
    }
}
