//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    /// Mail transport fault (connect, verify, send). Message keeps the raw transport text.
    #[error("{0}")]
    Transport(String),

    #[error("Attachment decoding failed: {0}")]
    Decode(String),

    #[error("Message composition failed: {0}")]
    Compose(String),

    #[error("Dispatch request failed: {0}")]
    Dispatch(String),

    #[error("UI error: {0}")]
    Ui(String),
}
