//! Mail adapters. Implement MailTransportFactory / MailSettingsPort.
//!
//! Provides the lettre SMTP transport and a recording mock for testing.

pub mod mock_transport;
pub mod smtp_transport;

pub use mock_transport::{MockTransportFactory, StaticMailSettings};
pub use smtp_transport::SmtpTransportFactory;
