//! # Text Measurement and Fitting
//!
//! Field text goes through two independent constraints: a character cap
//! (applied in [`crate::record`]) and a pixel-width fit applied here.
//!
//! ## Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`TtfFont`] | A TrueType/OpenType file loaded at runtime (ab_glyph) |
//! | [`SpleenFont`] | Built-in Spleen 12×24 bitmap font, scaled to size |
//! | [`FixedAdvanceFont`] | Deterministic block glyphs for tests and calibration |
//!
//! Fitting only ever calls [`FontBackend::measure`]; drawing calls
//! [`FontBackend::rasterize`] at the size the fit settled on.

mod bitmap;
pub mod fit;
mod fixed;
mod ttf;

pub use bitmap::SpleenFont;
pub use fit::{FitPolicy, FittedText, fit_text, shrink_to_fit, truncate_to_width, wrap_lines};
pub use fixed::FixedAdvanceFont;
pub use ttf::TtfFont;

use crate::error::TimesheetError;

/// Smallest font size the shrink loop reaches.
pub const MIN_FONT_SIZE: f32 = 12.0;

/// Appended to truncated text.
pub const ELLIPSIS: &str = "…";

/// Text rendered as an anti-aliased coverage buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphCoverage {
    pub width: usize,
    pub height: usize,
    /// Row-major coverage: 0.0 = no ink, 1.0 = full ink.
    pub data: Vec<f32>,
}

impl GlyphCoverage {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// Font metrics and rasterization.
///
/// `measure` and `rasterize` must agree: the width returned by `measure` is
/// the advance width of the text `rasterize` draws at the same pixel size.
pub trait FontBackend: Send + Sync {
    /// Advance width of `text` at `px` pixels.
    fn measure(&self, text: &str, px: f32) -> f32;

    /// Render `text` at `px` pixels into a coverage buffer one line tall.
    fn rasterize(&self, text: &str, px: f32) -> Result<GlyphCoverage, TimesheetError>;
}
