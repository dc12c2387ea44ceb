//! Generic HTTP endpoint adapter.
//!
//! POSTs `file` and `meta` as multipart form data, the same shape this
//! crate's own `/api/submit` route accepts, so a renderer can hand off to a
//! forwarding server running elsewhere.

use async_trait::async_trait;
use serde_json::Value;

use super::{UploadPayload, UploadReceipt, Uploader, http_client, png_part};
use crate::error::TimesheetError;

#[derive(Debug)]
pub struct EndpointUploader {
    client: reqwest::Client,
    url: String,
}

impl EndpointUploader {
    pub fn new(url: impl Into<String>) -> Result<Self, TimesheetError> {
        Ok(Self {
            client: http_client()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Uploader for EndpointUploader {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    async fn upload(&self, payload: &UploadPayload) -> Result<UploadReceipt, TimesheetError> {
        let mut form = reqwest::multipart::Form::new().part("file", png_part(payload)?);
        if let Some(meta) = &payload.meta_json {
            form = form.text("meta", meta.clone());
        }

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TimesheetError::Upload(format!("Upload request failed: {}", e)))?;

        let success = response.status().is_success();
        let body = response.text().await.unwrap_or_default();
        parse_endpoint_response(success, &body)
    }
}

/// Interpret an `/api/submit`-style response.
///
/// On failure the message is the body's `error` field, else the raw body,
/// else a generic message. On success the id is taken from `id` or
/// `telegram.message_id`.
pub fn parse_endpoint_response(success: bool, body: &str) -> Result<UploadReceipt, TimesheetError> {
    let data: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    if !success {
        let message = match data.get("error").and_then(Value::as_str) {
            Some(error) => error.to_string(),
            None if !body.trim().is_empty() => body.to_string(),
            None => "Upload failed".to_string(),
        };
        return Err(TimesheetError::Upload(message));
    }

    let id = data
        .get("id")
        .or_else(|| data.pointer("/telegram/message_id"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    Ok(UploadReceipt { id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_id() {
        let receipt = parse_endpoint_response(true, r#"{"ok":true,"id":"abc"}"#).unwrap();
        assert_eq!(receipt.id, "abc");
    }

    #[test]
    fn test_success_with_telegram_message() {
        let receipt =
            parse_endpoint_response(true, r#"{"ok":true,"telegram":{"message_id":7}}"#).unwrap();
        assert_eq!(receipt.id, "7");
    }

    #[test]
    fn test_error_field() {
        let err = parse_endpoint_response(false, r#"{"error":"No file in request"}"#).unwrap_err();
        assert_eq!(err.to_string(), "No file in request");
    }

    #[test]
    fn test_plain_text_error() {
        let err = parse_endpoint_response(false, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_empty_error() {
        let err = parse_endpoint_response(false, "").unwrap_err();
        assert_eq!(err.to_string(), "Upload failed");
    }
}
