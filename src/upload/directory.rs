//! Local directory adapter.
//!
//! Stores each sheet as `<name>.png` with a `<name>.json` metadata sidecar.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{UploadPayload, UploadReceipt, Uploader};
use crate::error::TimesheetError;

#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
}

impl DirectoryUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Keep only the final path component so a file name can't escape the directory.
fn safe_file_name(filename: &str) -> Result<String, TimesheetError> {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TimesheetError::Upload(format!("Invalid file name '{}'", filename)))
}

#[async_trait]
impl Uploader for DirectoryUploader {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn upload(&self, payload: &UploadPayload) -> Result<UploadReceipt, TimesheetError> {
        let filename = safe_file_name(&payload.filename)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let image_path = self.dir.join(&filename);
        tokio::fs::write(&image_path, &payload.image).await?;

        if let Some(meta) = &payload.meta_json {
            tokio::fs::write(image_path.with_extension("json"), meta).await?;
        }

        Ok(UploadReceipt { id: filename })
    }
}
