//! Template compositor.
//!
//! ## Pipeline
//!
//! ```text
//! load template ─▶ canvas @ natural size ─▶ template layer
//!      ─▶ header fields ─▶ row fields ─▶ signature overlay ─▶ raster
//! ```
//!
//! Each step feeds the next; any failure aborts the render and no partial
//! image is returned.

use image::{Rgb, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;

use super::Canvas;
use crate::error::TimesheetError;
use crate::layout::{FieldFit, Rect, TemplateLayout};
use crate::record::TimesheetRecord;
use crate::signature::{remove_background, resize_overlay};
use crate::text::{FitPolicy, FontBackend, fit_text};

/// Where the template image comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl TemplateSource {
    /// Decode the template at its natural size.
    pub fn load(&self) -> Result<RgbaImage, TimesheetError> {
        let image = match self {
            TemplateSource::Path(path) => image::open(path).map_err(|e| {
                TimesheetError::TemplateLoad(format!("{}: {}", path.display(), e))
            })?,
            TemplateSource::Bytes(bytes) => image::load_from_memory(bytes)
                .map_err(|e| TimesheetError::TemplateLoad(e.to_string()))?,
        };
        Ok(image.to_rgba8())
    }
}

/// Renders timesheet records onto one template.
///
/// Owns its template source, layout and font so independent renders never
/// share drawing state.
#[derive(Clone)]
pub struct Compositor {
    template: TemplateSource,
    layout: TemplateLayout,
    font: Arc<dyn FontBackend>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("template", &self.template)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    pub fn new(template: TemplateSource, layout: TemplateLayout, font: Arc<dyn FontBackend>) -> Self {
        Self {
            template,
            layout,
            font,
        }
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    /// Render `record` and the raw signature raster onto the template.
    ///
    /// `signature` is the opaque capture-surface raster; its background is
    /// removed here.
    pub fn render(
        &self,
        record: &TimesheetRecord,
        signature: &RgbaImage,
    ) -> Result<RgbaImage, TimesheetError> {
        let template = self.template.load()?;

        let mut canvas = Canvas::new(template.width(), template.height());
        canvas.draw_image(&template, 0.0, 0.0);

        let layout = &self.layout;
        let header_size = layout.header_font_size;
        for (text, field) in [
            (&record.employee_name, &layout.name),
            (&record.job_role, &layout.job_role),
            (&record.care_home, &layout.care_home),
        ] {
            self.draw_field(
                &mut canvas,
                text,
                field.anchor.x,
                field.anchor.y,
                header_size,
                &field.fit,
            )?;
        }

        let row_y = layout.row_baseline();
        let row_size = layout.row_font_size;
        let date = record.sheet_date();
        let break_minutes = record.break_minutes.to_string();
        let total = record.total_hours_label();
        for (text, field) in [
            (&date, &layout.date),
            (&record.start_time, &layout.start_time),
            (&record.end_time, &layout.end_time),
            (&break_minutes, &layout.break_minutes),
            (&total, &layout.total_hours),
            (&record.job_role_short, &layout.job_role_short),
            (&record.remarks, &layout.remarks),
        ] {
            self.draw_field(&mut canvas, text, field.x, row_y, row_size, &field.fit)?;
        }

        self.draw_signature(&mut canvas, signature);

        tracing::debug!(
            width = canvas.width(),
            height = canvas.height(),
            "timesheet rendered"
        );
        Ok(canvas.into_image())
    }

    /// Render and encode as PNG.
    pub fn render_png(
        &self,
        record: &TimesheetRecord,
        signature: &RgbaImage,
    ) -> Result<Vec<u8>, TimesheetError> {
        let image = self.render(record, signature)?;
        super::encode_png(&image)
    }

    fn draw_field(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        fit: &FieldFit,
    ) -> Result<(), TimesheetError> {
        let floor = self.layout.min_font_size;
        let font = self.font.as_ref();

        match *fit {
            FieldFit::Verbatim => {
                let fitted = fit_text(font, text, size, floor, FitPolicy::Verbatim);
                self.fill_lines(canvas, &fitted.lines, x, y, fitted.size, 0.0)
            }
            FieldFit::Shrink { max_width } => {
                let fitted = fit_text(font, text, size, floor, FitPolicy::Shrink { max_width });
                self.fill_lines(canvas, &fitted.lines, x, y, fitted.size, 0.0)
            }
            FieldFit::Wrap {
                max_width,
                line_height,
            } => {
                let fitted = fit_text(font, text, size, floor, FitPolicy::Wrap { max_width });
                self.fill_lines(canvas, &fitted.lines, x, y, fitted.size, line_height)
            }
            FieldFit::Cell { right } => {
                let cell = self.layout.cell;
                let right = right.resolve(canvas.width());
                let clip = Rect::new(
                    x,
                    y - cell.half_height,
                    (right - x).max(0.0),
                    cell.half_height * 2.0,
                );
                let max_width = clip.width - cell.padding * 2.0;
                let fitted = fit_text(font, text, size, floor, FitPolicy::Truncate { max_width });

                canvas.push_clip(clip);
                let result = self.fill_lines(canvas, &fitted.lines, x + cell.padding, y, fitted.size, 0.0);
                canvas.pop_clip();
                result
            }
        }
    }

    fn fill_lines(
        &self,
        canvas: &mut Canvas,
        lines: &[String],
        x: f32,
        y: f32,
        size: f32,
        line_height: f32,
    ) -> Result<(), TimesheetError> {
        let [r, g, b] = self.layout.text_color;
        for (i, line) in lines.iter().enumerate() {
            let glyphs = self.font.rasterize(line, size)?;
            canvas.fill_text(&glyphs, x, y + i as f32 * line_height, Rgb([r, g, b]));
        }
        Ok(())
    }

    fn draw_signature(&self, canvas: &mut Canvas, signature: &RgbaImage) {
        let placement = &self.layout.signature;
        let overlay = remove_background(signature, placement.threshold);

        let dest = placement.destination();
        let width = (dest.width.round() as u32).max(1);
        let height = (dest.height.round() as u32).max(1);
        let scaled = resize_overlay(&overlay, width, height);

        canvas.push_clip(placement.bounds);
        canvas.draw_image(&scaled, dest.x, dest.y);
        canvas.pop_clip();
    }
}
