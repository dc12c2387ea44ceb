//! Server state and configuration.

use std::sync::Arc;

use crate::render::Compositor;
use crate::submit::Submitter;
use crate::upload::Uploader;

/// Default request body limit (signature PNGs are small, but templates are not).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub submitter: Submitter,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        compositor: Arc<Compositor>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            config,
            submitter: Submitter::new(compositor, uploader),
        }
    }

    pub fn uploader(&self) -> &Arc<dyn Uploader> {
        self.submitter.uploader()
    }
}
