//! Demo capture. Implements CapturePort without a camera.
//!
//! Renders a synthetic 800x600 page stamped with the capture time, encoded as an SVG data URI.

use crate::domain::{CapturedImage, DomainError};
use crate::ports::CapturePort;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Demo page generator. Each capture gets the next page number.
#[derive(Debug, Default)]
pub struct DemoCapture {
    pages: AtomicUsize,
}

impl DemoCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(page: usize, time: &str) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="600" viewBox="0 0 800 600">
  <rect width="800" height="600" fill="#f0f0f0"/>
  <text x="400" y="300" font-family="Arial" font-size="48" fill="#333" text-anchor="middle">Демо документ</text>
  <text x="400" y="350" font-family="Arial" font-size="24" fill="#333" text-anchor="middle">Заснет в {time}</text>
  <text x="400" y="390" font-family="Arial" font-size="18" fill="#666" text-anchor="middle">Страница {page}</text>
</svg>
"##
        )
    }
}

#[async_trait::async_trait]
impl CapturePort for DemoCapture {
    async fn capture(&self) -> Result<CapturedImage, DomainError> {
        let page = self.pages.fetch_add(1, Ordering::SeqCst) + 1;
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        let svg = Self::render(page, &time);
        info!(page, "[DEMO] captured synthetic page");
        Ok(CapturedImage::from_bytes("image/svg+xml", svg.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_pages_are_distinct_svg() {
        let cam = DemoCapture::new();
        let a = cam.capture().await.unwrap();
        let b = cam.capture().await.unwrap();
        assert_eq!(a.mime_type(), "image/svg+xml");
        assert_eq!(a.extension(), "svg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_render_contains_stamp() {
        let svg = DemoCapture::render(2, "10:11:12");
        assert!(svg.contains("Заснет в 10:11:12"));
        assert!(svg.contains("Страница 2"));
    }
}
