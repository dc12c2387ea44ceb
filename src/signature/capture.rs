//! Freehand capture surface.
//!
//! ## State machine
//!
//! ```text
//!          Down                 Move (draws segment last → pos)
//!   Idle ────────▶ Drawing ◀──────┐
//!    ▲                │  └────────┘
//!    └──── Up ────────┘
//! ```
//!
//! `Up` is honoured wherever the pointer is released, including outside the
//! surface; filtering it by bounds would leave a stroke stuck "down".
//! `Clear` repaints the surface white from any state and leaves it idle.
//!
//! Pointer positions arrive in client (screen) space and are remapped into
//! the surface's fixed raster resolution using the on-screen rectangle, which
//! may be a different size than the raster.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::TimesheetError;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Largest raster side a recording may ask for.
pub const MAX_SURFACE_SIDE: u32 = 4096;

/// Most events a single recording may carry.
pub const MAX_RECORDED_EVENTS: usize = 20_000;

/// On-screen placement of the surface, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// A pointer or touch event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeState {
    Idle,
    Drawing { last: (f32, f32) },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pen {
    width: f32,
    color: Rgba<u8>,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 3.0,
            color: Rgba([0x11, 0x11, 0x11, 255]),
        }
    }
}

/// Signature pad: a white raster that pointer strokes are drawn into.
#[derive(Debug, Clone)]
pub struct CaptureSurface {
    raster: RgbaImage,
    screen: ScreenRect,
    state: StrokeState,
    pen: Pen,
    inked: bool,
}

impl CaptureSurface {
    pub const DEFAULT_WIDTH: u32 = 500;
    pub const DEFAULT_HEIGHT: u32 = 200;

    /// A blank surface whose on-screen rectangle matches its raster 1:1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RgbaImage::from_pixel(width, height, PAPER),
            screen: ScreenRect {
                left: 0.0,
                top: 0.0,
                width: width as f32,
                height: height as f32,
            },
            state: StrokeState::Idle,
            pen: Pen::default(),
            inked: false,
        }
    }

    pub fn with_screen_rect(mut self, rect: ScreenRect) -> Self {
        self.screen = rect;
        self
    }

    /// Update the on-screen rectangle (e.g. after a responsive resize).
    pub fn set_screen_rect(&mut self, rect: ScreenRect) {
        self.screen = rect;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// True if nothing has been drawn since creation or the last clear.
    pub fn is_blank(&self) -> bool {
        !self.inked
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn into_raster(self) -> RgbaImage {
        self.raster
    }

    /// Map a client-space point into raster coordinates.
    pub fn to_surface(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = self.raster.dimensions();
        let sx = if self.screen.width > 0.0 {
            w as f32 / self.screen.width
        } else {
            1.0
        };
        let sy = if self.screen.height > 0.0 {
            h as f32 / self.screen.height
        } else {
            1.0
        };
        ((x - self.screen.left) * sx, (y - self.screen.top) * sy)
    }

    /// Feed one event through the state machine.
    pub fn handle(&mut self, event: PointerEvent) {
        match (self.state, event) {
            (_, PointerEvent::Clear) => self.clear(),
            (_, PointerEvent::Down { x, y }) => {
                self.state = StrokeState::Drawing {
                    last: self.to_surface(x, y),
                };
            }
            (StrokeState::Drawing { last }, PointerEvent::Move { x, y }) => {
                let pos = self.to_surface(x, y);
                self.stroke(last, pos);
                self.state = StrokeState::Drawing { last: pos };
            }
            (StrokeState::Idle, PointerEvent::Move { .. }) => {}
            (_, PointerEvent::Up) => self.state = StrokeState::Idle,
        }
    }

    /// Feed a sequence of events.
    pub fn replay(&mut self, events: impl IntoIterator<Item = PointerEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    /// Repaint the surface white and forget any stroke in progress.
    pub fn clear(&mut self) {
        for pixel in self.raster.pixels_mut() {
            *pixel = PAPER;
        }
        self.state = StrokeState::Idle;
        self.inked = false;
    }

    /// Draw a round-capped segment by stamping pen discs along it.
    ///
    /// Only the part of the segment that can touch the raster is stamped, so
    /// the work is bounded by the raster size however far the pointer went.
    fn stroke(&mut self, from: (f32, f32), to: (f32, f32)) {
        let r = self.pen.width / 2.0;
        let (w, h) = self.raster.dimensions();
        let Some((from, to)) = clip_segment(from, to, (-r, -r), (w as f32 + r, h as f32 + r))
        else {
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();
        let steps = (length / 0.5).ceil().max(1.0) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(from.0 + dx * t, from.1 + dy * t);
        }
        self.inked = true;
    }

    fn stamp(&mut self, cx: f32, cy: f32) {
        let r = self.pen.width / 2.0;
        let (w, h) = self.raster.dimensions();

        let y0 = (cy - r).floor().max(0.0) as u32;
        let y1 = ((cy + r).ceil().max(0.0) as u32).min(h);
        let x0 = (cx - r).floor().max(0.0) as u32;
        let x1 = ((cx + r).ceil().max(0.0) as u32).min(w);

        for py in y0..y1 {
            for px in x0..x1 {
                let ddx = px as f32 + 0.5 - cx;
                let ddy = py as f32 + 0.5 - cy;
                if ddx * ddx + ddy * ddy <= r * r {
                    self.raster.put_pixel(px, py, self.pen.color);
                }
            }
        }
    }
}

/// Clip a segment to an axis-aligned box (Liang-Barsky).
///
/// Returns `None` when the segment misses the box or any coordinate is not
/// finite. The returned endpoints lie inside the box.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    min: (f32, f32),
    max: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    if ![from.0, from.1, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }

    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    let edges = [
        (-dx, from.0 - min.0),
        (dx, max.0 - from.0),
        (-dy, from.1 - min.1),
        (dy, max.1 - from.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let ratio = q / p;
        if p < 0.0 {
            if ratio > t1 {
                return None;
            }
            t0 = t0.max(ratio);
        } else {
            if ratio < t0 {
                return None;
            }
            t1 = t1.min(ratio);
        }
    }

    let point = |t: f32| {
        (
            (from.0 + dx * t).clamp(min.0, max.0),
            (from.1 + dy * t).clamp(min.1, max.1),
        )
    };
    Some((point(t0), point(t1)))
}

impl Default for CaptureSurface {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// Raster size of a recorded surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Pointer events recorded on a client, replayable into a fresh surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecording {
    #[serde(default)]
    pub surface: Option<SurfaceSize>,
    #[serde(default)]
    pub rect: Option<ScreenRect>,
    pub events: Vec<PointerEvent>,
}

impl StrokeRecording {
    /// Replay the events into a new surface.
    ///
    /// Rejects surfaces larger than [`MAX_SURFACE_SIDE`] on either side,
    /// recordings longer than [`MAX_RECORDED_EVENTS`], and non-finite
    /// screen rectangles.
    pub fn replay(&self) -> Result<CaptureSurface, TimesheetError> {
        if self.events.len() > MAX_RECORDED_EVENTS {
            return Err(TimesheetError::validation(format!(
                "Signature has too many strokes ({} events, max {})",
                self.events.len(),
                MAX_RECORDED_EVENTS
            )));
        }

        let mut surface = match self.surface {
            Some(size) => {
                let valid = |side: u32| (1..=MAX_SURFACE_SIDE).contains(&side);
                if !valid(size.width) || !valid(size.height) {
                    return Err(TimesheetError::validation(format!(
                        "Signature surface {}x{} is out of range (1..={} per side)",
                        size.width, size.height, MAX_SURFACE_SIDE
                    )));
                }
                CaptureSurface::new(size.width, size.height)
            }
            None => CaptureSurface::default(),
        };

        if let Some(rect) = self.rect {
            let finite = [rect.left, rect.top, rect.width, rect.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(TimesheetError::validation(
                    "Signature screen rectangle is not finite",
                ));
            }
            surface.set_screen_rect(rect);
        }

        surface.replay(self.events.iter().copied());
        Ok(surface)
    }
}
