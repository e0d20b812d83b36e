//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the workflow state machine and failure classification live here.

pub mod classify;
pub mod entities;
pub mod errors;
pub mod workflow;

pub use classify::classify_fault;
pub use entities::{
    CapturedImage, DispatchErrorKind, DispatchOutcome, EmailDispatchRequest, EmailDispatchResult,
    MailAttachment, MailSettings, Notice, OutgoingMail, ProcessedImages, Stage,
};
pub use errors::DomainError;
pub use workflow::{Action, Effect, WorkflowState, transition};
