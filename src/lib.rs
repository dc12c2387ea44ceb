//! # Timesheet - Template Compositing Renderer
//!
//! Turns a filled-in timesheet form and a hand-drawn signature into a single
//! PNG that looks like the paper sheet, then forwards it to wherever
//! submissions are collected. It provides:
//!
//! - **Coordinate map**: where each field lands on the template image
//! - **Signature capture**: pointer events → stroke raster, with background removal
//! - **Text fitting**: verbatim, shrink-to-fit, clip + ellipsis and two-line wrap
//! - **Compositing**: template + text + signature overlay at the template's size
//! - **Upload**: Telegram, any `/api/submit`-style endpoint, or a local directory
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use timesheet::{
//!     layout::TemplateLayout,
//!     record::{FormFields, TimesheetRecord},
//!     render::{Compositor, TemplateSource},
//!     signature::{CaptureSurface, PointerEvent},
//!     text::SpleenFont,
//! };
//!
//! let compositor = Compositor::new(
//!     TemplateSource::Path("template.png".into()),
//!     TemplateLayout::default(),
//!     Arc::new(SpleenFont),
//! );
//!
//! // Form fields as submitted
//! let fields: FormFields = [
//!     ("name", "Jane Doe"),
//!     ("careHome", "Rose Court"),
//!     ("jobRole", "Nurse"),
//!     ("date", "2026-02-05"),
//!     ("startTime", "09:00"),
//!     ("endTime", "17:30"),
//!     ("breakMins", "30"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//! let record = TimesheetRecord::from_fields(&fields)?;
//!
//! // A signature drawn with a pointer
//! let mut pad = CaptureSurface::default();
//! pad.replay([
//!     PointerEvent::Down { x: 40.0, y: 120.0 },
//!     PointerEvent::Move { x: 260.0, y: 80.0 },
//!     PointerEvent::Up,
//! ]);
//!
//! let png = compositor.render_png(&record, pad.raster())?;
//! std::fs::write("timesheet.png", png)?;
//!
//! # Ok::<(), timesheet::error::TimesheetError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Template coordinate map and fit policies |
//! | [`record`] | Form normalization and business rules |
//! | [`signature`] | Stroke capture and background removal |
//! | [`text`] | Font backends and the text fitting engine |
//! | [`render`] | Canvas and compositor |
//! | [`upload`] | Upload adapters |
//! | [`submit`] | Render → encode → upload with a re-entrancy guard |
//! | [`server`] | HTTP endpoints |
//! | [`config`] | Layout, font and upload target loading |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod layout;
pub mod record;
pub mod render;
pub mod server;
pub mod signature;
pub mod submit;
pub mod text;
pub mod upload;

// Re-exports for convenience
pub use error::TimesheetError;
pub use layout::TemplateLayout;
pub use record::{SubmissionMeta, TimesheetRecord};
pub use render::Compositor;
pub use submit::{Submission, Submitter};
