//! Timesheet submit and preview handlers.
//!
//! Both take the same multipart form: one text part per form field, plus the
//! signature as either a `signature` PNG or a `strokes` JSON recording.

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use super::super::state::AppState;
use super::{ApiError, multipart_error, status_for};
use crate::error::TimesheetError;
use crate::record::FormFields;
use crate::signature::{StrokeRecording, flatten_onto_white};
use crate::submit::{SignatureInput, Submission, error_status, status_message};

/// Collect form fields and the signature from a multipart body.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, TimesheetError> {
    let mut fields = FormFields::new();
    let mut signature = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "signature" {
            let bytes = field.bytes().await.map_err(multipart_error)?;
            let image = image::load_from_memory(&bytes).map_err(|e| {
                TimesheetError::validation(format!("Failed to decode signature: {}", e))
            })?;
            signature = Some(SignatureInput::Raster(flatten_onto_white(&image)));
        } else if name == "strokes" {
            let text = field.text().await.map_err(multipart_error)?;
            let recording: StrokeRecording = serde_json::from_str(&text)
                .map_err(|e| TimesheetError::validation(format!("Invalid strokes: {}", e)))?;
            signature = Some(SignatureInput::Strokes(recording));
        } else if !name.is_empty() {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
        }
    }

    Ok(Submission { fields, signature })
}

fn failure(error: TimesheetError) -> ApiError {
    let status = status_for(&error);
    (
        status,
        Json(json!({
            "ok": false,
            "error": error.to_string(),
            "status": error_status(&error),
        })),
    )
}

/// POST /api/timesheet - validate, render and upload.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();
    let submission = read_submission(multipart).await.map_err(failure)?;

    let result = state.submitter.submit(submission).await;
    let status = status_message(&result);

    match result {
        Ok(outcome) => {
            tracing::info!(%request_id, filename = %outcome.filename, "timesheet submitted");
            Ok(Json(json!({
                "ok": true,
                "id": outcome.receipt.id,
                "filename": outcome.filename,
                "status": status,
            })))
        }
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "timesheet submission failed");
            Err(failure(e))
        }
    }
}

/// POST /api/timesheet/preview - render without uploading.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let submission = read_submission(multipart).await.map_err(failure)?;
    let png = state.submitter.preview(submission).await.map_err(failure)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
