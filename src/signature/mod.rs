//! # Signature Capture
//!
//! - [`capture`]: the freehand drawing surface (pointer events → stroke raster)
//! - [`background`]: turns the white surface background transparent so the
//!   strokes can be laid over the template

pub mod background;
pub mod capture;

pub use background::{
    DEFAULT_THRESHOLD, flatten_onto_white, has_ink, remove_background, resize_overlay,
};
pub use capture::{
    CaptureSurface, MAX_RECORDED_EVENTS, MAX_SURFACE_SIDE, PointerEvent, ScreenRect, StrokeRecording,
    SurfaceSize,
};
