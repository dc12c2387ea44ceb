//! # Upload Adapters
//!
//! Forward a rendered timesheet to wherever submissions are collected.
//!
//! Every adapter receives the same [`UploadPayload`]: the PNG bytes, their
//! file name, and the metadata JSON. The compositor doesn't know or care
//! which backend is on the other side.
//!
//! | Adapter | Backend |
//! |---------|---------|
//! | [`TelegramUploader`] | Telegram Bot API `sendDocument` |
//! | [`EndpointUploader`] | Any HTTP endpoint following the `/api/submit` contract |
//! | [`DirectoryUploader`] | A local directory (PNG + JSON sidecar) |

mod directory;
mod endpoint;
mod telegram;

pub use directory::DirectoryUploader;
pub use endpoint::{EndpointUploader, parse_endpoint_response};
pub use telegram::{TelegramUploader, build_caption, parse_telegram_response};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::TimesheetError;
use crate::record::SubmissionMeta;

/// A rendered sheet ready to send.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub filename: String,
    pub image: Vec<u8>,
    /// Metadata as the JSON text that travels in the `meta` part.
    pub meta_json: Option<String>,
}

impl UploadPayload {
    pub fn new(
        filename: impl Into<String>,
        image: Vec<u8>,
        meta: &SubmissionMeta,
    ) -> Result<Self, TimesheetError> {
        Ok(Self {
            filename: filename.into(),
            image,
            meta_json: Some(serde_json::to_string(meta)?),
        })
    }

    /// Parse the metadata back, if present and well formed.
    pub fn meta(&self) -> Option<SubmissionMeta> {
        self.meta_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }
}

/// What the backend handed back for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Backend-specific identifier (message id, file name, ...).
    pub id: String,
}

/// A destination for rendered timesheets.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn upload(&self, payload: &UploadPayload) -> Result<UploadReceipt, TimesheetError>;
}

/// Shared HTTP client for the network adapters.
pub(crate) fn http_client() -> Result<reqwest::Client, TimesheetError> {
    reqwest::Client::builder()
        .user_agent(concat!("timesheet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TimesheetError::Config(format!("HTTP client error: {}", e)))
}

/// The image part shared by the multipart adapters.
pub(crate) fn png_part(payload: &UploadPayload) -> Result<reqwest::multipart::Part, TimesheetError> {
    reqwest::multipart::Part::bytes(payload.image.clone())
        .file_name(payload.filename.clone())
        .mime_str("image/png")
        .map_err(|e| TimesheetError::Upload(format!("Invalid upload part: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SubmissionMeta {
        SubmissionMeta {
            name: "Jane Doe".to_string(),
            care_home: "Rose Court".to_string(),
            job_role_top: "Nurse".to_string(),
            job_role_row: "Nurse".to_string(),
            date: "2026-02-05".to_string(),
            start_time: "09:00".to_string(),
            end_time: "17:30".to_string(),
            break_mins: 30,
            total_hours: 8.0,
            remarks: String::new(),
        }
    }

    #[test]
    fn test_payload_meta_round_trip() {
        let payload = UploadPayload::new("sheet.png", vec![1, 2, 3], &meta()).unwrap();
        assert_eq!(payload.meta(), Some(meta()));
    }

    #[test]
    fn test_payload_malformed_meta() {
        let payload = UploadPayload {
            filename: "sheet.png".to_string(),
            image: vec![],
            meta_json: Some("{oops".to_string()),
        };
        assert_eq!(payload.meta(), None);
    }
}
