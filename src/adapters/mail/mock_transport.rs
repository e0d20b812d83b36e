//! Mock mail transport for testing without an SMTP relay.
//!
//! Records every session opened and every message sent. Can be configured to
//! fail verification or sending with a given fault text, and to simulate a slow relay.

use crate::domain::{DomainError, MailSettings, OutgoingMail};
use crate::ports::{MailSettingsPort, MailTransport, MailTransportFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

/// Fixed settings, for tests and offline runs.
#[derive(Debug, Clone)]
pub struct StaticMailSettings(pub MailSettings);

impl StaticMailSettings {
    pub fn example() -> Self {
        Self(MailSettings {
            host: "smtp.example.com".into(),
            port: 587,
            user: Some("scanner@example.com".into()),
            password: Some("app-password".into()),
            from: "scanner@example.com".into(),
            to: "scans@example.com".into(),
        })
    }
}

impl MailSettingsPort for StaticMailSettings {
    fn mail_settings(&self) -> Result<MailSettings, DomainError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct Recorder {
    opened: AtomicUsize,
    sends: AtomicUsize,
    sent: Mutex<Vec<OutgoingMail>>,
}

/// Mock transport factory.
#[derive(Default)]
pub struct MockTransportFactory {
    recorder: Arc<Recorder>,
    verify_error: Option<String>,
    send_error: Option<String>,
    send_delay: Duration,
}

impl MockTransportFactory {
    /// Every session verifies and sends successfully, immediately.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_verify(fault: &str) -> Self {
        Self {
            verify_error: Some(fault.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_send(fault: &str) -> Self {
        Self {
            send_error: Some(fault.to_string()),
            ..Self::default()
        }
    }

    /// Simulate a slow relay: each send waits `delay` before completing.
    pub fn with_send_delay(delay: Duration) -> Self {
        Self {
            send_delay: delay,
            ..Self::default()
        }
    }

    /// Number of sessions opened so far.
    pub fn open_calls(&self) -> usize {
        self.recorder.opened.load(Ordering::SeqCst)
    }

    /// Number of send attempts so far (successful or not).
    pub fn send_calls(&self) -> usize {
        self.recorder.sends.load(Ordering::SeqCst)
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.recorder
            .sent
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl MailTransportFactory for MockTransportFactory {
    fn open(&self, settings: &MailSettings) -> Result<Box<dyn MailTransport>, DomainError> {
        self.recorder.opened.fetch_add(1, Ordering::SeqCst);
        info!(host = %settings.host, port = settings.port, "[MOCK] opening mail session");
        Ok(Box::new(MockTransport {
            recorder: Arc::clone(&self.recorder),
            verify_error: self.verify_error.clone(),
            send_error: self.send_error.clone(),
            send_delay: self.send_delay,
        }))
    }
}

struct MockTransport {
    recorder: Arc<Recorder>,
    verify_error: Option<String>,
    send_error: Option<String>,
    send_delay: Duration,
}

#[async_trait::async_trait]
impl MailTransport for MockTransport {
    async fn verify(&self) -> Result<(), DomainError> {
        match &self.verify_error {
            Some(fault) => Err(DomainError::Transport(fault.clone())),
            None => Ok(()),
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<String, DomainError> {
        let n = self.recorder.sends.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        if let Some(fault) = &self.send_error {
            return Err(DomainError::Transport(fault.clone()));
        }
        if let Ok(mut sent) = self.recorder.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(format!("<mock-{}@example.com>", n))
    }
}
