//! # Submit Flow
//!
//! One submission, start to finish:
//!
//! ```text
//! form fields ─▶ TimesheetRecord ─┐
//!                                 ├─▶ Compositor ─▶ PNG ─▶ Uploader
//! signature (raster | strokes) ───┘
//! ```
//!
//! Input is validated before anything is rendered. Only one submission runs
//! at a time per [`Submitter`]; a second one arriving mid-flight is rejected
//! with [`TimesheetError::Busy`] rather than queued.

use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TimesheetError;
use crate::record::{FormFields, TimesheetRecord};
use crate::render::Compositor;
use crate::signature::{StrokeRecording, has_ink};
use crate::upload::{UploadPayload, UploadReceipt, Uploader};

/// The drawn signature, either as a raster or as recorded pointer events.
#[derive(Debug, Clone)]
pub enum SignatureInput {
    /// An opaque raster, white background with dark ink.
    Raster(RgbaImage),
    Strokes(StrokeRecording),
}

impl SignatureInput {
    /// Resolve to a raster, rejecting a blank signature.
    pub fn into_raster(self, threshold: u8) -> Result<RgbaImage, TimesheetError> {
        let raster = match self {
            SignatureInput::Raster(raster) => {
                if !has_ink(&raster, threshold) {
                    return Err(TimesheetError::validation("Please sign the timesheet"));
                }
                raster
            }
            SignatureInput::Strokes(recording) => {
                let surface = recording.replay()?;
                if surface.is_blank() {
                    return Err(TimesheetError::validation("Please sign the timesheet"));
                }
                surface.into_raster()
            }
        };
        Ok(raster)
    }
}

/// Everything a client sends for one timesheet.
#[derive(Debug, Clone)]
pub struct Submission {
    pub fields: FormFields,
    pub signature: Option<SignatureInput>,
}

/// A validated submission: normalized record plus signature raster.
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    pub record: TimesheetRecord,
    pub signature: RgbaImage,
}

impl Submission {
    /// Validate fields and signature against the compositor's layout.
    ///
    /// Replaying a stroke recording is CPU work; async callers run this on
    /// the blocking pool (see [`Submitter::submit`]).
    pub fn prepare(self, compositor: &Compositor) -> Result<PreparedSubmission, TimesheetError> {
        let layout = compositor.layout();
        let record = TimesheetRecord::from_fields_with(&self.fields, &layout.limits)?;
        let signature = self
            .signature
            .ok_or_else(|| TimesheetError::validation("Please sign the timesheet"))?
            .into_raster(layout.signature.threshold)?;
        Ok(PreparedSubmission { record, signature })
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub filename: String,
    pub receipt: UploadReceipt,
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, TimesheetError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TimesheetError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders and uploads submissions, one at a time.
pub struct Submitter {
    compositor: Arc<Compositor>,
    uploader: Arc<dyn Uploader>,
    in_flight: AtomicBool,
}

impl Submitter {
    pub fn new(compositor: Arc<Compositor>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            compositor,
            uploader,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn uploader(&self) -> &Arc<dyn Uploader> {
        &self.uploader
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, render, encode and upload one submission.
    pub async fn submit(&self, submission: Submission) -> Result<SubmitOutcome, TimesheetError> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let (record, png) = render_png(self.compositor.clone(), submission).await?;
        let meta = record.meta();
        let filename = record.file_name(chrono::Utc::now().timestamp_millis());
        tracing::info!(filename = %filename, bytes = png.len(), "rendered timesheet");

        let payload = UploadPayload::new(filename.clone(), png, &meta)?;
        let receipt = self.uploader.upload(&payload).await?;
        tracing::info!(
            backend = self.uploader.name(),
            id = %receipt.id,
            "uploaded timesheet"
        );

        Ok(SubmitOutcome { filename, receipt })
    }

    /// Validate and render without uploading.
    pub async fn preview(&self, submission: Submission) -> Result<Vec<u8>, TimesheetError> {
        let (_, png) = render_png(self.compositor.clone(), submission).await?;
        Ok(png)
    }
}

/// Prepare and render on the blocking pool so the async runtime stays
/// responsive, including while a stroke recording is replayed.
async fn render_png(
    compositor: Arc<Compositor>,
    submission: Submission,
) -> Result<(TimesheetRecord, Vec<u8>), TimesheetError> {
    tokio::task::spawn_blocking(move || -> Result<_, TimesheetError> {
        let prepared = submission.prepare(&compositor)?;
        let png = compositor.render_png(&prepared.record, &prepared.signature)?;
        Ok((prepared.record, png))
    })
    .await
    .map_err(|e| TimesheetError::Image(format!("Render task failed: {}", e)))?
}

/// The single user-facing status line for a finished submission.
pub fn status_message(result: &Result<SubmitOutcome, TimesheetError>) -> String {
    match result {
        Ok(_) => "Submitted ✅".to_string(),
        Err(e) => error_status(e),
    }
}

pub fn error_status(error: &TimesheetError) -> String {
    format!("Error: {}", error)
}
