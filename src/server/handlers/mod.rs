//! HTTP handlers for the server.

pub mod submit;
pub mod timesheet;

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::error::TimesheetError;

/// Error response shape shared by the JSON endpoints.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn status_for(error: &TimesheetError) -> StatusCode {
    match error {
        TimesheetError::Validation(_) => StatusCode::BAD_REQUEST,
        TimesheetError::Busy => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub(crate) fn multipart_error(e: axum::extract::multipart::MultipartError) -> TimesheetError {
    TimesheetError::validation(format!("Multipart error: {}", e))
}
