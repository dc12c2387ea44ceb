//! # Rendering Module
//!
//! Composites a [`TimesheetRecord`](crate::record::TimesheetRecord) and a
//! signature onto the template image.
//!
//! ## Modules
//!
//! - [`canvas`]: RGBA surface with clipping and source-over blending
//! - [`compositor`]: the render pipeline driven by a
//!   [`TemplateLayout`](crate::layout::TemplateLayout)
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use timesheet::layout::TemplateLayout;
//! use timesheet::record::{FormFields, TimesheetRecord};
//! use timesheet::render::{Compositor, TemplateSource};
//! use timesheet::signature::CaptureSurface;
//! use timesheet::text::SpleenFont;
//!
//! let compositor = Compositor::new(
//!     TemplateSource::Path("template.png".into()),
//!     TemplateLayout::default(),
//!     Arc::new(SpleenFont::new()),
//! );
//!
//! let fields: FormFields = serde_json::from_str(r#"{
//!     "name": "Jane Doe", "careHome": "Rose Court", "jobRole": "Nurse",
//!     "date": "2026-02-05", "startTime": "09:00", "endTime": "17:30", "breakMins": "30"
//! }"#)?;
//! let record = TimesheetRecord::from_fields(&fields)?;
//! let signature = CaptureSurface::default();
//!
//! let png = compositor.render_png(&record, signature.raster())?;
//! std::fs::write("timesheet.png", png)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canvas;
pub mod compositor;

pub use canvas::Canvas;
pub use compositor::{Compositor, TemplateSource};

use image::RgbaImage;
use std::io::Cursor;

use crate::error::TimesheetError;

/// Encode an RGBA raster as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, TimesheetError> {
    let mut png_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .map_err(|e| TimesheetError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(png_bytes)
}
