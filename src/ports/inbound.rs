//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: interactive front end driving a capture session.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Walk the user through welcome → capture → process → complete until they quit.
    async fn run(&self) -> Result<(), DomainError>;
}
