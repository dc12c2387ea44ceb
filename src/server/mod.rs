//! # HTTP Server for Timesheet Submission
//!
//! Exposes the submit flow over HTTP.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/submit` | Forward an already rendered PNG (`file` + `meta`) to the backend |
//! | `POST /api/timesheet` | Validate, render and upload a timesheet |
//! | `POST /api/timesheet/preview` | Render only, respond with the PNG |
//!
//! ## Usage
//!
//! ```bash
//! timesheet serve --listen 0.0.0.0:8080 --template template.png
//! ```

mod handlers;
mod state;

pub use state::{AppState, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::TimesheetError;

/// Build the router for a prepared state.
pub fn router(state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    Router::new()
        .route("/api/submit", post(handlers::submit::forward))
        .route("/api/timesheet", post(handlers::timesheet::submit))
        .route("/api/timesheet/preview", post(handlers::timesheet::preview))
        .layer(middleware)
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use timesheet::layout::TemplateLayout;
/// use timesheet::render::{Compositor, TemplateSource};
/// use timesheet::server::{AppState, ServerConfig, serve};
/// use timesheet::text::SpleenFont;
/// use timesheet::upload::DirectoryUploader;
///
/// # async fn example() -> Result<(), timesheet::TimesheetError> {
/// let compositor = Compositor::new(
///     TemplateSource::Path("template.png".into()),
///     TemplateLayout::default(),
///     Arc::new(SpleenFont),
/// );
/// let state = AppState::new(
///     ServerConfig::default(),
///     Arc::new(compositor),
///     Arc::new(DirectoryUploader::new("submissions")),
/// );
///
/// serve(state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(state: AppState) -> Result<(), TimesheetError> {
    let listen_addr = state.config.listen_addr.clone();
    let backend = state.uploader().name();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| TimesheetError::Config(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    tracing::info!(addr = %listen_addr, backend, "timesheet server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| TimesheetError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
