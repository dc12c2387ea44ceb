//! # Template Layout
//!
//! The coordinate map of the timesheet template: where every field is drawn,
//! how it is fitted, and where the signature lands.
//!
//! All coordinates are in the pixel space of the template's natural
//! dimensions. Replacing the template image means recalibrating this table;
//! nothing is rescaled automatically.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────────┐
//!  │  NAME (100,235)        JOB ROLE (500,235)     CARE HOME (895,235)│
//!  ├──────┬──────┬─────┬───────┬───────┬──────────┬─────────┬─────────┤
//!  │ DATE │START │ END │ BREAK │ TOTAL │ JOB ROLE │  SIGN   │ REMARKS │  row_y = 402
//!  └──────┴──────┴─────┴───────┴───────┴──────────┴─────────┴─────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TimesheetError;
use crate::record::FieldLimits;

/// A single point in template space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in template space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Horizontal edge of a cell: an absolute x, or an inset from the canvas's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Edge {
    At(f32),
    Inset { inset: f32 },
}

impl Edge {
    /// Resolve to an absolute x coordinate for a canvas of the given width.
    pub fn resolve(&self, canvas_width: u32) -> f32 {
        match *self {
            Edge::At(x) => x,
            Edge::Inset { inset } => canvas_width as f32 - inset,
        }
    }
}

/// How a field's text is fitted into its space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FieldFit {
    /// Draw at the configured size, no fitting.
    Verbatim,
    /// Shrink the font until the text fits `max_width` (or the floor size is reached).
    Shrink { max_width: f32 },
    /// Clip to the cell spanning the field's x up to `right`, shrink, then truncate with an ellipsis.
    Cell { right: Edge },
    /// Greedy word wrap onto at most two lines.
    Wrap { max_width: f32, line_height: f32 },
}

/// A header field drawn at its own anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaderField {
    pub anchor: Anchor,
    pub fit: FieldFit,
}

/// A table field drawn at `x` on the shared row baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    pub x: f32,
    pub fit: FieldFit,
}

impl RowField {
    const fn verbatim(x: f32) -> Self {
        Self {
            x,
            fit: FieldFit::Verbatim,
        }
    }
}

/// Cell geometry shared by every [`FieldFit::Cell`] field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    /// Horizontal padding inside the cell on each side.
    pub padding: f32,
    /// Half the height of the clip region around the row baseline.
    pub half_height: f32,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            padding: 6.0,
            half_height: 18.0,
        }
    }
}

/// Where and how the signature overlay is composited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignaturePlacement {
    /// The signature cell; drawing is clipped to it.
    pub bounds: Rect,
    /// Overlay size as a fraction of the cell size.
    pub scale: f32,
    /// Top-left of the overlay relative to the cell. Centred when unset.
    pub offset: Option<Anchor>,
    /// Pixels with R, G and B all above this value become transparent.
    pub threshold: u8,
}

impl Default for SignaturePlacement {
    fn default() -> Self {
        Self {
            bounds: Rect::new(847.0, 370.0, 200.0, 80.0),
            scale: 0.5,
            offset: None,
            threshold: crate::signature::DEFAULT_THRESHOLD,
        }
    }
}

impl SignaturePlacement {
    /// The rectangle the overlay is scaled into.
    pub fn destination(&self) -> Rect {
        let width = self.bounds.width * self.scale;
        let height = self.bounds.height * self.scale;
        let (dx, dy) = match self.offset {
            Some(offset) => (offset.x, offset.y),
            None => (
                (self.bounds.width - width) / 2.0,
                (self.bounds.height - height) / 2.0,
            ),
        };
        Rect::new(self.bounds.x + dx, self.bounds.y + dy, width, height)
    }
}

/// The complete coordinate map for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub header_font_size: f32,
    pub row_font_size: f32,
    /// Smallest size the shrink loop will reach.
    pub min_font_size: f32,
    pub text_color: [u8; 3],

    pub name: HeaderField,
    pub job_role: HeaderField,
    pub care_home: HeaderField,

    /// Shared row baseline.
    pub row_y: f32,
    /// Nudge applied to `row_y` so text sits centred in the row.
    pub row_text_offset: f32,

    pub date: RowField,
    pub start_time: RowField,
    pub end_time: RowField,
    pub break_minutes: RowField,
    pub total_hours: RowField,
    pub job_role_short: RowField,
    pub remarks: RowField,

    pub cell: CellStyle,
    pub signature: SignaturePlacement,
    pub limits: FieldLimits,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        let signature = SignaturePlacement::default();
        let care_home = Anchor::new(895.0, 235.0);
        let job_role = Anchor::new(500.0, 235.0);

        Self {
            header_font_size: 24.0,
            row_font_size: 24.0,
            min_font_size: crate::text::MIN_FONT_SIZE,
            text_color: [0x11, 0x11, 0x11],

            name: HeaderField {
                anchor: Anchor::new(100.0, 235.0),
                fit: FieldFit::Verbatim,
            },
            // Stops 25px short of the care home column
            job_role: HeaderField {
                anchor: job_role,
                fit: FieldFit::Shrink {
                    max_width: (care_home.x - 25.0) - job_role.x,
                },
            },
            care_home: HeaderField {
                anchor: care_home,
                fit: FieldFit::Shrink { max_width: 320.0 },
            },

            row_y: 402.0,
            row_text_offset: 8.0,

            date: RowField::verbatim(103.0),
            start_time: RowField::verbatim(245.0),
            end_time: RowField::verbatim(350.0),
            break_minutes: RowField::verbatim(475.0),
            total_hours: RowField::verbatim(583.0),
            job_role_short: RowField {
                x: 698.0,
                fit: FieldFit::Cell {
                    right: Edge::At(signature.bounds.x - 10.0),
                },
            },
            remarks: RowField {
                x: 1033.0,
                fit: FieldFit::Cell {
                    right: Edge::Inset { inset: 12.0 },
                },
            },

            cell: CellStyle::default(),
            signature,
            limits: FieldLimits::default(),
        }
    }
}

impl TemplateLayout {
    /// The y coordinate every row field is vertically centred on.
    pub fn row_baseline(&self) -> f32 {
        self.row_y + self.row_text_offset
    }

    /// Parse a layout from JSON. Missing keys fall back to the default layout.
    pub fn from_json(json: &str) -> Result<Self, TimesheetError> {
        serde_json::from_str(json)
            .map_err(|e| TimesheetError::Config(format!("Invalid layout: {}", e)))
    }

    /// Load a layout from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TimesheetError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TimesheetError::Config(format!("Failed to read layout {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_job_role_stops_before_care_home() {
        let layout = TemplateLayout::default();
        match layout.job_role.fit {
            FieldFit::Shrink { max_width } => assert_eq!(max_width, 370.0),
            other => panic!("unexpected fit {:?}", other),
        }
    }

    #[test]
    fn test_row_baseline_includes_offset() {
        let layout = TemplateLayout::default();
        assert_eq!(layout.row_baseline(), 410.0);
    }

    #[test]
    fn test_edge_resolution() {
        assert_eq!(Edge::At(837.0).resolve(1200), 837.0);
        assert_eq!(Edge::Inset { inset: 12.0 }.resolve(1200), 1188.0);
    }

    #[test]
    fn test_signature_destination_is_centred() {
        let placement = SignaturePlacement::default();
        let dest = placement.destination();
        assert_eq!(dest, Rect::new(897.0, 390.0, 100.0, 40.0));
    }

    #[test]
    fn test_signature_destination_with_offset() {
        let placement = SignaturePlacement {
            offset: Some(Anchor::new(4.0, 2.0)),
            ..Default::default()
        };
        let dest = placement.destination();
        assert_eq!(dest.x, 851.0);
        assert_eq!(dest.y, 372.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let layout = TemplateLayout::from_json(
            r#"{
                "row_y": 500,
                "remarks": { "x": 900, "fit": { "policy": "cell", "right": { "inset": 20 } } },
                "care_home": { "anchor": { "x": 880, "y": 230 },
                               "fit": { "policy": "wrap", "max_width": 300, "line_height": 26 } }
            }"#,
        )
        .unwrap();

        assert_eq!(layout.row_y, 500.0);
        assert_eq!(layout.remarks.x, 900.0);
        assert_eq!(
            layout.remarks.fit,
            FieldFit::Cell {
                right: Edge::Inset { inset: 20.0 }
            }
        );
        assert!(matches!(layout.care_home.fit, FieldFit::Wrap { .. }));
        assert_eq!(layout.date, TemplateLayout::default().date);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = TemplateLayout::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TimesheetError::Config(_)));
    }
}
