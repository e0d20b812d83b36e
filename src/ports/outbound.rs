//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    CapturedImage, DispatchOutcome, DomainError, EmailDispatchRequest, MailSettings,
    OutgoingMail, ProcessedImages,
};

/// Source of SMTP settings. Read on every dispatch call, never cached.
pub trait MailSettingsPort: Send + Sync {
    fn mail_settings(&self) -> Result<MailSettings, DomainError>;
}

/// Opens a fresh transport session per dispatch call.
pub trait MailTransportFactory: Send + Sync {
    /// Build a session from settings. No network traffic yet.
    fn open(&self, settings: &MailSettings) -> Result<Box<dyn MailTransport>, DomainError>;
}

/// One transport session (connection to a mail relay).
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// Actively check the relay is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), DomainError>;

    /// Submit the message. Returns the message id.
    async fn send(&self, mail: &OutgoingMail) -> Result<String, DomainError>;
}

/// Client side of the dispatch exchange.
#[async_trait::async_trait]
pub trait DispatchPort: Send + Sync {
    /// Hand one request to the dispatch service. `Err` is a transport-level fault
    /// (service unreachable, unreadable reply); service-side failures come back as
    /// `DispatchOutcome::Rejected`.
    async fn dispatch(&self, request: &EmailDispatchRequest)
    -> Result<DispatchOutcome, DomainError>;
}

/// Processing strategy applied between capture and dispatch.
#[async_trait::async_trait]
pub trait ProcessingPort: Send + Sync {
    async fn process(&self, images: &[CapturedImage]) -> Result<ProcessedImages, DomainError>;
}

/// Produces one captured page.
#[async_trait::async_trait]
pub trait CapturePort: Send + Sync {
    async fn capture(&self) -> Result<CapturedImage, DomainError>;
}
