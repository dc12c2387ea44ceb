//! Telegram Bot API adapter.
//!
//! Sends the sheet as a document to a chat with a short caption built from
//! the metadata.

use async_trait::async_trait;
use serde_json::Value;

use super::{UploadPayload, UploadReceipt, Uploader, http_client, png_part};
use crate::error::TimesheetError;
use crate::record::format_hours;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const FALLBACK_CAPTION: &str = "New timesheet submitted ✅";

pub struct TelegramUploader {
    client: reqwest::Client,
    token: String,
    chat_id: String,
    api_base: String,
}

impl std::fmt::Debug for TelegramUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("TelegramUploader")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramUploader {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, TimesheetError> {
        Ok(Self {
            client: http_client()?,
            token: token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` from the environment.
    pub fn from_env() -> Result<Self, TimesheetError> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| TimesheetError::Config("Missing TELEGRAM_BOT_TOKEN".to_string()))?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| TimesheetError::Config("Missing TELEGRAM_CHAT_ID".to_string()))?;
        Self::new(token, chat_id)
    }

    /// Point at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendDocument",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl Uploader for TelegramUploader {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn upload(&self, payload: &UploadPayload) -> Result<UploadReceipt, TimesheetError> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", build_caption(payload.meta_json.as_deref()))
            .part("document", png_part(payload)?);

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TimesheetError::Upload(format!("Telegram request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        parse_telegram_response(status.as_u16(), status.is_success(), &body)
    }
}

/// Interpret a `sendDocument` response.
///
/// Success needs both a 2xx status and `"ok": true`; the receipt id is the
/// message id.
pub fn parse_telegram_response(
    status: u16,
    success: bool,
    body: &str,
) -> Result<UploadReceipt, TimesheetError> {
    let data: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    if !success || data.get("ok").and_then(Value::as_bool) != Some(true) {
        let message = match data.get("description").and_then(Value::as_str) {
            Some(description) => description.to_string(),
            None if !body.is_empty() => format!("Telegram error: {}", body),
            None => format!("Telegram upload failed (HTTP {})", status),
        };
        return Err(TimesheetError::Upload(message));
    }

    let id = data
        .pointer("/result/message_id")
        .map(value_to_string)
        .unwrap_or_default();
    Ok(UploadReceipt { id })
}

/// Caption for the document message, built from the metadata JSON.
pub fn build_caption(meta_json: Option<&str>) -> String {
    let Some(json) = meta_json else {
        return FALLBACK_CAPTION.to_string();
    };
    let Ok(data) = serde_json::from_str::<Value>(json) else {
        return FALLBACK_CAPTION.to_string();
    };
    if !data.is_object() {
        return FALLBACK_CAPTION.to_string();
    }

    let field = |key: &str| data.get(key).map(value_to_string).unwrap_or_default();
    let name = match field("name") {
        name if name.is_empty() => "Employee".to_string(),
        name => name,
    };
    let hours = match data.get("totalHours") {
        Some(Value::Number(n)) => n.as_f64().map(format_hours).unwrap_or_default(),
        _ => field("totalHours"),
    };

    format!(
        "New timesheet ✅\nName: {}\nDate: {}\nShift: {} - {}\nHours: {}",
        name,
        field("date"),
        field("startTime"),
        field("endTime"),
        hours,
    )
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
