//! Upload forwarding endpoint.
//!
//! Accepts a rendered PNG as `file` and optional metadata JSON as `meta`,
//! and hands both to the configured uploader unchanged.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use super::super::state::AppState;
use super::{ApiError, error_body};
use crate::upload::UploadPayload;

/// POST /api/submit - forward `file` + `meta` to the backend.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut meta: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_body(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    error_body(StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                })?;
                file = Some((filename, bytes.to_vec()));
            }
            "meta" => {
                let text = field.text().await.map_err(|e| {
                    error_body(StatusCode::BAD_REQUEST, format!("Failed to read meta: {}", e))
                })?;
                meta = Some(text);
            }
            _ => {}
        }
    }

    let (filename, image) =
        file.ok_or_else(|| error_body(StatusCode::BAD_REQUEST, "No file in request"))?;
    let filename = filename
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("timesheet_{}.png", chrono::Utc::now().timestamp_millis()));

    let payload = UploadPayload {
        filename,
        image,
        meta_json: meta,
    };

    let uploader = state.uploader();
    match uploader.upload(&payload).await {
        Ok(receipt) => {
            tracing::info!(
                backend = uploader.name(),
                filename = %payload.filename,
                id = %receipt.id,
                "forwarded submission"
            );
            Ok(Json(json!({ "ok": true, "id": receipt.id })))
        }
        Err(e) => {
            tracing::warn!(backend = uploader.name(), error = %e, "forward failed");
            Err(error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
