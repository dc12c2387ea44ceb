//! Fixed-advance block font.
//!
//! Every character advances by the same fraction of the pixel size and is
//! drawn as a solid block (whitespace stays blank). Widths are exact and
//! platform independent, which makes layouts reproducible in tests.

use super::{FontBackend, GlyphCoverage};
use crate::error::TimesheetError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceFont {
    /// Advance per character as a fraction of the pixel size.
    advance: f32,
}

impl FixedAdvanceFont {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }

    fn char_width(&self, px: f32) -> f32 {
        self.advance * px
    }
}

impl Default for FixedAdvanceFont {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl FontBackend for FixedAdvanceFont {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * self.char_width(px)
    }

    fn rasterize(&self, text: &str, px: f32) -> Result<GlyphCoverage, TimesheetError> {
        let char_width = self.char_width(px);
        let width = self.measure(text, px).ceil().max(1.0) as usize;
        let height = px.ceil().max(1.0) as usize;
        let mut coverage = GlyphCoverage::empty(width, height);

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            // Leave a one pixel gap on the right of each block
            let x0 = (i as f32 * char_width).round() as usize;
            let x1 = (((i + 1) as f32 * char_width).round() as usize)
                .saturating_sub(1)
                .min(width);
            for y in 0..height {
                for x in x0..x1 {
                    coverage.data[y * width + x] = 1.0;
                }
            }
        }

        Ok(coverage)
    }
}
