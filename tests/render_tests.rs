//! # End-to-end Render Tests
//!
//! Renders complete timesheets onto a synthetic template and checks the
//! output image and the upload payload that leaves the submit flow.

use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::sync::Arc;

use timesheet::layout::TemplateLayout;
use timesheet::record::{FormFields, SubmissionMeta, TimesheetRecord};
use timesheet::render::{Compositor, TemplateSource, encode_png};
use timesheet::signature::{CaptureSurface, PointerEvent, StrokeRecording};
use timesheet::submit::{SignatureInput, Submission, Submitter};
use timesheet::text::{FixedAdvanceFont, FontBackend, SpleenFont};
use timesheet::upload::DirectoryUploader;

const TEMPLATE_WIDTH: u32 = 1200;
const TEMPLATE_HEIGHT: u32 = 500;
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn template() -> TemplateSource {
    let image = RgbaImage::from_pixel(TEMPLATE_WIDTH, TEMPLATE_HEIGHT, PAPER);
    TemplateSource::Bytes(encode_png(&image).unwrap().into())
}

fn compositor_with(font: Arc<dyn FontBackend>) -> Compositor {
    Compositor::new(template(), TemplateLayout::default(), font)
}

fn fields(pairs: &[(&str, &str)]) -> FormFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn shift() -> FormFields {
    fields(&[
        ("name", "Jane Doe"),
        ("careHome", "Other"),
        ("careHomeOther", "Willow Lodge"),
        ("jobRole", "Senior Care Assistant"),
        ("date", "2026-02-05"),
        ("startTime", "22:00"),
        ("endTime", "06:00"),
        ("breakMins", "30"),
        ("totalHours", "99"),
        ("remarks", "Covered night"),
    ])
}

fn scribble() -> CaptureSurface {
    let mut surface = CaptureSurface::default();
    surface.replay([
        PointerEvent::Down { x: 40.0, y: 100.0 },
        PointerEvent::Move { x: 200.0, y: 60.0 },
        PointerEvent::Move { x: 460.0, y: 140.0 },
        PointerEvent::Up,
    ]);
    surface
}

fn is_ink(pixel: &Rgba<u8>) -> bool {
    pixel[0] < 128 && pixel[1] < 128 && pixel[2] < 128
}

// ============================================================================
// RENDER
// ============================================================================

#[test]
fn test_output_matches_template_size() {
    let compositor = compositor_with(Arc::new(FixedAdvanceFont::default()));
    let record = TimesheetRecord::from_fields(&shift()).unwrap();

    let image = compositor.render(&record, scribble().raster()).unwrap();
    assert_eq!(
        (image.width(), image.height()),
        (TEMPLATE_WIDTH, TEMPLATE_HEIGHT)
    );
}

#[test]
fn test_name_lands_at_its_anchor() {
    let compositor = compositor_with(Arc::new(FixedAdvanceFont::default()));
    let record = TimesheetRecord::from_fields(&shift()).unwrap();
    let image = compositor.render(&record, scribble().raster()).unwrap();

    // First block of "Jane Doe" starts at x = 100, centred on y = 235
    assert!(is_ink(image.get_pixel(105, 235)));
    assert!(!is_ink(image.get_pixel(95, 235)));
}

#[test]
fn test_signature_stays_inside_its_cell() {
    let layout = TemplateLayout::default();
    let bounds = layout.signature.bounds;
    let compositor = compositor_with(Arc::new(FixedAdvanceFont::default()));
    let record = TimesheetRecord::from_fields(&fields(&[
        ("name", "A"),
        ("careHome", "B"),
        ("jobRole", "C"),
        ("date", "2026-02-05"),
        ("startTime", "09:00"),
        ("endTime", "17:00"),
    ]))
    .unwrap();

    let image = compositor.render(&record, scribble().raster()).unwrap();

    let mut inside = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        let (fx, fy) = (x as f32, y as f32);
        let in_cell = fx >= bounds.x && fx < bounds.right() && fy >= bounds.y && fy < bounds.bottom();
        if in_cell && *pixel != PAPER {
            inside += 1;
        }
    }
    assert!(inside > 0, "signature ink should appear in the cell");

    // The area just outside the cell edges stays untouched
    for y in (bounds.y as u32)..(bounds.bottom() as u32) {
        assert_eq!(*image.get_pixel(bounds.x as u32 - 1, y), PAPER);
        assert_eq!(*image.get_pixel(bounds.right() as u32 + 1, y), PAPER);
    }
}

#[test]
fn test_blank_signature_leaves_cell_empty() {
    let layout = TemplateLayout::default();
    let bounds = layout.signature.bounds;
    let compositor = compositor_with(Arc::new(FixedAdvanceFont::default()));
    let record = TimesheetRecord::from_fields(&fields(&[
        ("name", "A"),
        ("careHome", "B"),
        ("jobRole", "C"),
        ("date", "2026-02-05"),
        ("startTime", "09:00"),
        ("endTime", "17:00"),
    ]))
    .unwrap();

    let image = compositor
        .render(&record, CaptureSurface::default().raster())
        .unwrap();
    for y in (bounds.y as u32)..(bounds.bottom() as u32) {
        for x in (bounds.x as u32)..(bounds.right() as u32) {
            assert_eq!(*image.get_pixel(x, y), PAPER);
        }
    }
}

#[test]
fn test_render_with_bitmap_font() {
    let compositor = compositor_with(Arc::new(SpleenFont));
    let record = TimesheetRecord::from_fields(&shift()).unwrap();

    let image = compositor.render(&record, scribble().raster()).unwrap();
    assert_eq!(image.width(), TEMPLATE_WIDTH);

    let inked = image.pixels().filter(|p| is_ink(p)).count();
    assert!(inked > 100, "expected rendered text, found {} ink pixels", inked);
}

#[test]
fn test_row_cells_clip_at_their_right_edge() {
    // Uncapped remarks and a wide font so both cell fields overflow
    let mut layout = TemplateLayout::default();
    layout.limits.remarks = None;
    let baseline = layout.row_baseline();
    let padding = layout.cell.padding;
    let job_role_x = layout.job_role_short.x;
    let remarks_x = layout.remarks.x;
    let signature_x = layout.signature.bounds.x;
    let job_role_edge = signature_x - 10.0;
    let remarks_edge = TEMPLATE_WIDTH as f32 - 12.0;

    let record = TimesheetRecord::from_fields_with(
        &fields(&[
            ("name", "A"),
            ("careHome", "B"),
            ("jobRole", "Senior Care Assistant"),
            ("date", "2026-02-05"),
            ("startTime", "09:00"),
            ("endTime", "17:00"),
            ("remarks", "Stayed late to cover the handover for the night team"),
        ]),
        &layout.limits,
    )
    .unwrap();
    let compositor = Compositor::new(template(), layout, Arc::new(FixedAdvanceFont::new(1.0)));
    let image = compositor
        .render(&record, CaptureSurface::default().raster())
        .unwrap();

    let band = (baseline as u32 - 18)..(baseline as u32 + 18);
    let ink_in = |x0: f32, x1: f32| {
        band.clone().any(|y| {
            ((x0 as u32)..(x1 as u32)).any(|x| *image.get_pixel(x, y) != PAPER)
        })
    };

    // Text starts after the cell padding and stops before the cell edge
    assert!(!ink_in(job_role_x, job_role_x + padding));
    assert!(ink_in(job_role_x + padding, job_role_edge));
    assert!(!ink_in(job_role_edge, signature_x));

    assert!(!ink_in(remarks_x, remarks_x + padding));
    assert!(ink_in(remarks_x + padding, remarks_edge));
    assert!(!ink_in(remarks_edge, TEMPLATE_WIDTH as f32));
}

#[test]
fn test_broken_template_fails_render() {
    let compositor = Compositor::new(
        TemplateSource::Bytes(Arc::from(&b"not an image"[..])),
        TemplateLayout::default(),
        Arc::new(FixedAdvanceFont::default()),
    );
    let record = TimesheetRecord::from_fields(&shift()).unwrap();

    let err = compositor.render(&record, scribble().raster()).unwrap_err();
    assert!(err.to_string().starts_with("Failed to load template"));
}

// ============================================================================
// SUBMIT FLOW
// ============================================================================

#[tokio::test]
async fn test_submission_payload_round_trips_metadata() {
    let dir = std::env::temp_dir().join(format!("timesheet-e2e-{}", uuid::Uuid::new_v4()));
    let submitter = Submitter::new(
        Arc::new(compositor_with(Arc::new(FixedAdvanceFont::default()))),
        Arc::new(DirectoryUploader::new(&dir)),
    );

    let recording = StrokeRecording {
        surface: None,
        rect: None,
        events: vec![
            PointerEvent::Down { x: 10.0, y: 10.0 },
            PointerEvent::Move { x: 300.0, y: 150.0 },
            PointerEvent::Up,
        ],
    };
    let outcome = submitter
        .submit(Submission {
            fields: shift(),
            signature: Some(SignatureInput::Strokes(recording)),
        })
        .await
        .unwrap();

    let png = std::fs::read(dir.join(&outcome.filename)).unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!(
        (image.width(), image.height()),
        (TEMPLATE_WIDTH, TEMPLATE_HEIGHT)
    );

    let sidecar = dir.join(&outcome.filename).with_extension("json");
    let meta: SubmissionMeta =
        serde_json::from_str(&std::fs::read_to_string(sidecar).unwrap()).unwrap();
    let record = TimesheetRecord::from_fields(&shift()).unwrap();
    assert_eq!(meta, record.meta());
    assert_eq!(meta.care_home, "Willow Lodge");
    assert_eq!(meta.total_hours, 7.5);
    assert_eq!(meta.job_role_row, "Senior Care Ass…");

    std::fs::remove_dir_all(&dir).unwrap();
}
