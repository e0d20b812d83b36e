//! File capture. Implements CapturePort by reading an image file from disk.
//!
//! Mime type comes from the file extension.

use crate::domain::{CapturedImage, DomainError};
use crate::ports::CapturePort;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads one image file per capture.
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Mime type for the extension of `path`, if it is a supported image type.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

#[async_trait::async_trait]
impl CapturePort for FileCapture {
    async fn capture(&self) -> Result<CapturedImage, DomainError> {
        let mime = mime_for_path(&self.path).ok_or_else(|| {
            DomainError::Capture(format!("unsupported file type: {}", self.path.display()))
        })?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DomainError::Capture(format!("{}: {}", self.path.display(), e)))?;
        info!(path = %self.path.display(), bytes = bytes.len(), "captured image from file");
        Ok(CapturedImage::from_bytes(mime, &bytes))
    }
}
