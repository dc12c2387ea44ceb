//! Runtime configuration: layout files, fonts and upload targets.
//!
//! Credentials come from the environment (a `.env` file is honoured by the
//! binary); everything else is passed in explicitly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::TimesheetError;
use crate::layout::TemplateLayout;
use crate::text::{FontBackend, SpleenFont, TtfFont};
use crate::upload::{DirectoryUploader, EndpointUploader, TelegramUploader, Uploader};

/// Load a layout file, or the built-in coordinates when none is given.
pub fn load_layout(path: Option<&Path>) -> Result<TemplateLayout, TimesheetError> {
    match path {
        Some(path) => {
            let layout = TemplateLayout::from_file(path)?;
            tracing::info!(path = %path.display(), "loaded template layout");
            Ok(layout)
        }
        None => Ok(TemplateLayout::default()),
    }
}

/// Load a TrueType font, falling back to the built-in bitmap font.
pub fn load_font(path: Option<&Path>) -> Result<Arc<dyn FontBackend>, TimesheetError> {
    match path {
        Some(path) => {
            let font = TtfFont::from_path(path)?;
            tracing::info!(path = %path.display(), "loaded TrueType font");
            Ok(Arc::new(font))
        }
        None => {
            tracing::debug!("using built-in bitmap font");
            Ok(Arc::new(SpleenFont))
        }
    }
}

/// Where rendered sheets are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Telegram, with credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    Telegram,
    /// An HTTP endpoint accepting `file` + `meta`.
    Endpoint(String),
    Directory(PathBuf),
}

impl UploadTarget {
    /// Pick a target from explicit options, defaulting to Telegram.
    ///
    /// A directory wins over an endpoint when both are given.
    pub fn resolve(dir: Option<PathBuf>, url: Option<String>) -> Self {
        match (dir, url) {
            (Some(dir), _) => UploadTarget::Directory(dir),
            (None, Some(url)) => UploadTarget::Endpoint(url),
            (None, None) => UploadTarget::Telegram,
        }
    }

    pub fn build(&self) -> Result<Arc<dyn Uploader>, TimesheetError> {
        let uploader: Arc<dyn Uploader> = match self {
            UploadTarget::Telegram => Arc::new(TelegramUploader::from_env()?),
            UploadTarget::Endpoint(url) => Arc::new(EndpointUploader::new(url.clone())?),
            UploadTarget::Directory(dir) => Arc::new(DirectoryUploader::new(dir.clone())),
        };
        tracing::info!(backend = uploader.name(), "upload target configured");
        Ok(uploader)
    }
}
