//! # Error Types
//!
//! This module defines error types used throughout the timesheet library.

use thiserror::Error;

/// Main error type for timesheet operations
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// The template image could not be read or decoded
    #[error("Failed to load template: {0}")]
    TemplateLoad(String),

    /// Missing or malformed form input, rejected before rendering
    #[error("{0}")]
    Validation(String),

    /// Image decoding, encoding or compositing error
    #[error("Image error: {0}")]
    Image(String),

    /// Font loading or glyph rasterization error
    #[error("Font error: {0}")]
    Font(String),

    /// The upload backend rejected the submission or could not be reached
    #[error("{0}")]
    Upload(String),

    /// A submission is already being rendered or uploaded
    #[error("A submission is already in progress")]
    Busy,

    /// Invalid configuration (layout file, credentials, CLI arguments)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimesheetError {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
