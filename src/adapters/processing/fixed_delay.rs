//! Placeholder processing. Implements ProcessingPort.
//!
//! Waits a fixed latency and hands the images back untouched. A real enhancement
//! pipeline plugs in behind the same port.

use crate::domain::{CapturedImage, DomainError, ProcessedImages};
use crate::ports::ProcessingPort;
use std::time::Duration;
use tracing::info;

pub struct FixedDelayProcessor {
    delay: Duration,
}

impl FixedDelayProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait::async_trait]
impl ProcessingPort for FixedDelayProcessor {
    async fn process(&self, images: &[CapturedImage]) -> Result<ProcessedImages, DomainError> {
        info!(
            count = images.len(),
            delay_ms = self.delay.as_millis() as u64,
            "simulating image processing"
        );
        tokio::time::sleep(self.delay).await;
        Ok(ProcessedImages(images.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_returns_images_unchanged_after_delay() {
        let images = vec![
            CapturedImage::from_bytes("image/png", b"1"),
            CapturedImage::from_bytes("image/png", b"2"),
        ];
        let started = Instant::now();
        let out = FixedDelayProcessor::from_millis(30)
            .process(&images)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(out, ProcessedImages(images));
    }
}
